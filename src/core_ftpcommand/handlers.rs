use crate::core_ftpcommand::error::ProtocolError;
use crate::core_ftpcommand::ftpcommand::{CommandLine, FtpCommand};
use crate::core_ftpcommand::utils::send_reply;
use crate::core_ftpcommand::{
    abor, allo, auth, cdup, cwd, dele, feat, help, list, mdtm, mfmt, mkd, mlst, mode, noop, opts,
    pass, pwd, quit, rein, rest, retr, rmd, rnfr, rnto, site, size, stat, stor, stru, syst, type_,
    user,
};
use crate::core_network::stream::ControlStream;
use crate::core_network::{pasv, port};
use crate::core_perm::authorize;
use crate::session::Session;
use log::{debug, warn};
use std::io;

/// What the connection loop does after a command has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Close,
    /// AUTH TLS was accepted; the control stream must be wrapped before the
    /// next command is read.
    UpgradeControl,
}

/// Answers one command line.
///
/// The gates run in a fixed order: unknown verbs, the pending rename, the
/// control-channel TLS requirement, then login and permission checks. A
/// command handler only runs once all of them pass.
pub async fn dispatch(
    control: &mut ControlStream,
    session: &mut Session,
    line: &CommandLine,
) -> Result<Outcome, io::Error> {
    let command = match line.command {
        Some(command) => command,
        None => {
            warn!("[{}] Unknown command: {}", session.peer_addr, line.verb);
            session.rename_from = None;
            let reply = ProtocolError::UnknownCommand(line.verb.clone()).to_ftp_response();
            send_reply(control.get_mut(), &reply).await?;
            return Ok(Outcome::Continue);
        }
    };
    let arg = line.arg.as_str();

    if command != FtpCommand::RNTO {
        session.rename_from = None;
    }

    if matches!(command, FtpCommand::USER | FtpCommand::PASS) && control_tls_missing(session) {
        warn!(
            "[{}] {} refused on a plaintext control channel",
            session.peer_addr,
            command.as_str()
        );
        send_reply(control.get_mut(), "550 SSL/TLS required on the control channel.").await?;
        return Ok(Outcome::Continue);
    }

    let user = session.user().cloned();
    if let Err(e) = authorize(user.as_deref(), command, arg) {
        warn!("[{}] {}", session.peer_addr, e);
        send_reply(control.get_mut(), &e.to_ftp_response()).await?;
        return Ok(Outcome::Continue);
    }

    debug!("[{}] Dispatching {}", session.peer_addr, command.as_str());
    match command {
        FtpCommand::USER => user::handle_user_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::PASS => pass::handle_pass_command(control.get_mut(), session, arg).await,
        FtpCommand::QUIT => quit::handle_quit_command(control.get_mut(), session, arg).await,
        FtpCommand::REIN => rein::handle_rein_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::NOOP => noop::handle_noop_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::SYST => syst::handle_syst_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::FEAT => feat::handle_feat_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::HELP => help::handle_help_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::OPTS => opts::handle_opts_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::TYPE => type_::handle_type_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::MODE => mode::handle_mode_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::STRU => stru::handle_stru_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::ALLO => allo::handle_allo_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::REST => rest::handle_rest_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::ABOR => abor::handle_abor_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::PWD => pwd::handle_pwd_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::CWD => cwd::handle_cwd_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::CDUP => cdup::handle_cdup_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::MKD => mkd::handle_mkd_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::RMD => rmd::handle_rmd_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::DELE => dele::handle_dele_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::RNFR => rnfr::handle_rnfr_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::RNTO => rnto::handle_rnto_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::RETR => retr::handle_retr_command(control, session, arg).await,
        FtpCommand::STOR => stor::handle_stor_command(control, session, arg).await,
        FtpCommand::STOU => stor::handle_stou_command(control, session, arg).await,
        FtpCommand::APPE => stor::handle_appe_command(control, session, arg).await,
        FtpCommand::LIST => list::handle_list_command(control, session, arg).await,
        FtpCommand::NLST => list::handle_nlst_command(control, session, arg).await,
        FtpCommand::MLSD => list::handle_mlsd_command(control, session, arg).await,
        FtpCommand::MLST => mlst::handle_mlst_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::STAT => stat::handle_stat_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::SIZE => size::handle_size_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::MDTM => mdtm::handle_mdtm_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::MFMT => mfmt::handle_mfmt_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::SITE => site::handle_site_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::PASV => pasv::handle_pasv_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::EPSV => pasv::handle_epsv_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::PORT => port::handle_port_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::EPRT => port::handle_eprt_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::AUTH => auth::handle_auth_command(control.get_mut(), session, arg).await,
        FtpCommand::PBSZ => auth::handle_pbsz_command(control.get_mut(), session, arg).await.map(continued),
        FtpCommand::PROT => auth::handle_prot_command(control.get_mut(), session, arg).await.map(continued),
    }
}

fn continued(_: ()) -> Outcome {
    Outcome::Continue
}

/// Explicit FTPS with a mandatory control channel, before AUTH TLS.
fn control_tls_missing(session: &Session) -> bool {
    let tls = &session.ctx.config.tls;
    tls.control_required && !tls.implicit && !session.control_secure
}
