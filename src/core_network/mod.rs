// Sockets: listeners, the control stream, and the data channel negotiated by
// PASV/EPSV or PORT/EPRT.

pub mod data_channel;
pub mod network;
pub mod pasv;
pub mod port;
pub mod stream;
