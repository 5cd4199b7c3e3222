// Permission parsing and command authorization.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::core_auth::User;
    use crate::core_ftpcommand::ftpcommand::FtpCommand;
    use std::path::PathBuf;

    fn user_with(perms: &str) -> User {
        User {
            username: "alice".to_string(),
            password: "password".to_string(),
            home_dir: PathBuf::from("/srv"),
            permissions: perms.parse().unwrap(),
        }
    }

    const GATED: [(FtpCommand, &str); 17] = [
        (FtpCommand::CWD, "dir"),
        (FtpCommand::CDUP, ""),
        (FtpCommand::LIST, ""),
        (FtpCommand::NLST, ""),
        (FtpCommand::STAT, "/"),
        (FtpCommand::MLSD, ""),
        (FtpCommand::MLST, "file"),
        (FtpCommand::SIZE, "file"),
        (FtpCommand::RETR, "file"),
        (FtpCommand::APPE, "file"),
        (FtpCommand::DELE, "file"),
        (FtpCommand::RMD, "dir"),
        (FtpCommand::RNFR, "file"),
        (FtpCommand::MKD, "dir"),
        (FtpCommand::STOR, "file"),
        (FtpCommand::SITE, "CHMOD 644 file"),
        (FtpCommand::MFMT, "20200101000000 file"),
    ];

    #[test]
    fn test_parse_full_permission_string() {
        let perms: Permissions = "elradfmwMT".parse().unwrap();
        assert_eq!(perms, Permissions::all());
        assert_eq!(perms.to_string(), "elradfmwMT");
        let fixture: Permissions = "elradfmwM".parse().unwrap();
        assert!(!fixture.contains(Capability::SetTime));
    }

    #[test]
    fn test_parse_rejects_unknown_letter() {
        assert_eq!(
            "elrx".parse::<Permissions>(),
            Err(PermissionError::UnknownLetter('x'))
        );
    }

    #[test]
    fn test_display_is_canonical_order() {
        let perms: Permissions = "wre".parse().unwrap();
        assert_eq!(perms.to_string(), "erw");
    }

    #[test]
    fn test_denied_iff_capability_missing() {
        for cap in Capability::ALL {
            let full = user_with("elradfmwMT");
            let mut reduced = full.clone();
            reduced.permissions = full.permissions.without(cap);

            for (command, arg) in GATED {
                let needed = required_capability(command, arg).unwrap();
                assert!(authorize(Some(&full), command, arg).is_ok());
                let result = authorize(Some(&reduced), command, arg);
                assert_eq!(
                    result.is_err(),
                    needed == cap,
                    "{:?} {} without {}",
                    command,
                    arg,
                    cap
                );
            }
        }
    }

    #[test]
    fn test_ungated_commands_always_pass() {
        let nobody = user_with("");
        for command in [
            FtpCommand::PWD,
            FtpCommand::TYPE,
            FtpCommand::PASV,
            FtpCommand::PORT,
            FtpCommand::REST,
            FtpCommand::NOOP,
            FtpCommand::QUIT,
        ] {
            assert!(authorize(Some(&nobody), command, "").is_ok());
        }
        assert!(authorize(Some(&nobody), FtpCommand::STAT, "").is_ok());
        assert!(authorize(Some(&nobody), FtpCommand::SITE, "HELP").is_ok());
    }

    #[test]
    fn test_denied_reply_codes() {
        let reader = user_with("elr");
        let err = authorize(Some(&reader), FtpCommand::DELE, "file").unwrap_err();
        assert!(err.to_ftp_response().starts_with("550"));

        let err = authorize(None, FtpCommand::RETR, "file").unwrap_err();
        assert!(err.to_ftp_response().starts_with("530"));
    }

    #[test]
    fn test_unauthenticated_allowed_commands() {
        assert!(authorize(None, FtpCommand::USER, "alice").is_ok());
        assert!(authorize(None, FtpCommand::FEAT, "").is_ok());
        assert!(authorize(None, FtpCommand::STAT, "").is_ok());
        assert!(authorize(None, FtpCommand::STAT, "/").is_err());
        assert!(authorize(None, FtpCommand::PASV, "").is_err());
    }
}
