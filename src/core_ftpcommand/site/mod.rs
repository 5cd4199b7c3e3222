mod handler;

pub mod site_chmod;
pub mod site_help;

pub use handler::handle_site_command;
