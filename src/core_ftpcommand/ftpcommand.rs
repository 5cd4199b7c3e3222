#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    REIN,
    NOOP,
    SYST,
    FEAT,
    HELP,
    OPTS,
    TYPE,
    MODE,
    STRU,
    ALLO,
    REST,
    ABOR,
    PWD,
    CWD,
    CDUP,
    MKD,
    RMD,
    DELE,
    RNFR,
    RNTO,
    RETR,
    STOR,
    STOU,
    APPE,
    LIST,
    NLST,
    MLSD,
    MLST,
    STAT,
    SIZE,
    MDTM,
    MFMT,
    SITE,
    PASV,
    EPSV,
    PORT,
    EPRT,
    AUTH,
    PBSZ,
    PROT,
}

impl FtpCommand {
    pub const ALL: [FtpCommand; 43] = [
        FtpCommand::USER,
        FtpCommand::PASS,
        FtpCommand::QUIT,
        FtpCommand::REIN,
        FtpCommand::NOOP,
        FtpCommand::SYST,
        FtpCommand::FEAT,
        FtpCommand::HELP,
        FtpCommand::OPTS,
        FtpCommand::TYPE,
        FtpCommand::MODE,
        FtpCommand::STRU,
        FtpCommand::ALLO,
        FtpCommand::REST,
        FtpCommand::ABOR,
        FtpCommand::PWD,
        FtpCommand::CWD,
        FtpCommand::CDUP,
        FtpCommand::MKD,
        FtpCommand::RMD,
        FtpCommand::DELE,
        FtpCommand::RNFR,
        FtpCommand::RNTO,
        FtpCommand::RETR,
        FtpCommand::STOR,
        FtpCommand::STOU,
        FtpCommand::APPE,
        FtpCommand::LIST,
        FtpCommand::NLST,
        FtpCommand::MLSD,
        FtpCommand::MLST,
        FtpCommand::STAT,
        FtpCommand::SIZE,
        FtpCommand::MDTM,
        FtpCommand::MFMT,
        FtpCommand::SITE,
        FtpCommand::PASV,
        FtpCommand::EPSV,
        FtpCommand::PORT,
        FtpCommand::EPRT,
        FtpCommand::AUTH,
        FtpCommand::PBSZ,
        FtpCommand::PROT,
    ];

    /// Looks up a command verb, case-insensitively. The RFC 775 `X*` aliases
    /// map onto their modern counterparts.
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "REIN" => Some(FtpCommand::REIN),
            "NOOP" => Some(FtpCommand::NOOP),
            "SYST" => Some(FtpCommand::SYST),
            "FEAT" => Some(FtpCommand::FEAT),
            "HELP" => Some(FtpCommand::HELP),
            "OPTS" => Some(FtpCommand::OPTS),
            "TYPE" => Some(FtpCommand::TYPE),
            "MODE" => Some(FtpCommand::MODE),
            "STRU" => Some(FtpCommand::STRU),
            "ALLO" => Some(FtpCommand::ALLO),
            "REST" => Some(FtpCommand::REST),
            "ABOR" => Some(FtpCommand::ABOR),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "CWD" | "XCWD" => Some(FtpCommand::CWD),
            "CDUP" | "XCUP" => Some(FtpCommand::CDUP),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "STOU" => Some(FtpCommand::STOU),
            "APPE" => Some(FtpCommand::APPE),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "MLSD" => Some(FtpCommand::MLSD),
            "MLST" => Some(FtpCommand::MLST),
            "STAT" => Some(FtpCommand::STAT),
            "SIZE" => Some(FtpCommand::SIZE),
            "MDTM" => Some(FtpCommand::MDTM),
            "MFMT" => Some(FtpCommand::MFMT),
            "SITE" => Some(FtpCommand::SITE),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "PORT" => Some(FtpCommand::PORT),
            "EPRT" => Some(FtpCommand::EPRT),
            "AUTH" => Some(FtpCommand::AUTH),
            "PBSZ" => Some(FtpCommand::PBSZ),
            "PROT" => Some(FtpCommand::PROT),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::REIN => "REIN",
            FtpCommand::NOOP => "NOOP",
            FtpCommand::SYST => "SYST",
            FtpCommand::FEAT => "FEAT",
            FtpCommand::HELP => "HELP",
            FtpCommand::OPTS => "OPTS",
            FtpCommand::TYPE => "TYPE",
            FtpCommand::MODE => "MODE",
            FtpCommand::STRU => "STRU",
            FtpCommand::ALLO => "ALLO",
            FtpCommand::REST => "REST",
            FtpCommand::ABOR => "ABOR",
            FtpCommand::PWD => "PWD",
            FtpCommand::CWD => "CWD",
            FtpCommand::CDUP => "CDUP",
            FtpCommand::MKD => "MKD",
            FtpCommand::RMD => "RMD",
            FtpCommand::DELE => "DELE",
            FtpCommand::RNFR => "RNFR",
            FtpCommand::RNTO => "RNTO",
            FtpCommand::RETR => "RETR",
            FtpCommand::STOR => "STOR",
            FtpCommand::STOU => "STOU",
            FtpCommand::APPE => "APPE",
            FtpCommand::LIST => "LIST",
            FtpCommand::NLST => "NLST",
            FtpCommand::MLSD => "MLSD",
            FtpCommand::MLST => "MLST",
            FtpCommand::STAT => "STAT",
            FtpCommand::SIZE => "SIZE",
            FtpCommand::MDTM => "MDTM",
            FtpCommand::MFMT => "MFMT",
            FtpCommand::SITE => "SITE",
            FtpCommand::PASV => "PASV",
            FtpCommand::EPSV => "EPSV",
            FtpCommand::PORT => "PORT",
            FtpCommand::EPRT => "EPRT",
            FtpCommand::AUTH => "AUTH",
            FtpCommand::PBSZ => "PBSZ",
            FtpCommand::PROT => "PROT",
        }
    }

    /// One-line usage shown by `HELP <command>`.
    pub fn syntax(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER <SP> user-name (set username).",
            FtpCommand::PASS => "PASS [<SP> password] (set user password).",
            FtpCommand::QUIT => "QUIT (quit current session).",
            FtpCommand::REIN => "REIN (flush account).",
            FtpCommand::NOOP => "NOOP (just do nothing).",
            FtpCommand::SYST => "SYST (get operating system type).",
            FtpCommand::FEAT => "FEAT (list all new features supported).",
            FtpCommand::HELP => "HELP [<SP> cmd] (show help).",
            FtpCommand::OPTS => "OPTS <SP> cmd [<SP> option] (set option for command).",
            FtpCommand::TYPE => "TYPE <SP> [A | I] (set transfer type).",
            FtpCommand::MODE => "MODE <SP> mode (noop; set data transfer mode).",
            FtpCommand::STRU => "STRU <SP> type (noop; set file structure).",
            FtpCommand::ALLO => "ALLO <SP> bytes (noop; allocate storage).",
            FtpCommand::REST => "REST <SP> offset (set file offset).",
            FtpCommand::ABOR => "ABOR (abort transfer).",
            FtpCommand::PWD => "PWD (get current working directory).",
            FtpCommand::CWD => "CWD [<SP> dir-name] (change working directory).",
            FtpCommand::CDUP => "CDUP (go to parent directory).",
            FtpCommand::MKD => "MKD <SP> path (create directory).",
            FtpCommand::RMD => "RMD <SP> dir-name (remove directory).",
            FtpCommand::DELE => "DELE <SP> file-name (delete file).",
            FtpCommand::RNFR => "RNFR <SP> file-name (rename (source name)).",
            FtpCommand::RNTO => "RNTO <SP> file-name (rename (destination name)).",
            FtpCommand::RETR => "RETR <SP> file-name (retrieve a file).",
            FtpCommand::STOR => "STOR <SP> file-name (store a file).",
            FtpCommand::STOU => "STOU [<SP> name] (store a file with a unique name).",
            FtpCommand::APPE => "APPE <SP> file-name (append data to file).",
            FtpCommand::LIST => "LIST [<SP> path] (list files).",
            FtpCommand::NLST => "NLST [<SP> path] (list path in a compact form).",
            FtpCommand::MLSD => "MLSD [<SP> path] (list directory).",
            FtpCommand::MLST => "MLST [<SP> path] (show information about path).",
            FtpCommand::STAT => "STAT [<SP> path name] (server stats [list files]).",
            FtpCommand::SIZE => "SIZE <SP> file-name (get file size).",
            FtpCommand::MDTM => "MDTM [<SP> path] (file last modification time).",
            FtpCommand::MFMT => "MFMT <SP> timeval <SP> path (file update last modification time).",
            FtpCommand::SITE => "SITE <SP> site-command (execute SITE command).",
            FtpCommand::PASV => "PASV (open passive data connection).",
            FtpCommand::EPSV => "EPSV [<SP> proto/\"ALL\"] (open passive data connection).",
            FtpCommand::PORT => "PORT <SP> h,h,h,h,p,p (open active data connection).",
            FtpCommand::EPRT => "EPRT <SP> |proto|ip|port| (open active data connection).",
            FtpCommand::AUTH => "AUTH <SP> TLS|SSL (set up secure control channel).",
            FtpCommand::PBSZ => "PBSZ <SP> 0 (negotiate TLS buffer).",
            FtpCommand::PROT => "PROT <SP> [C|P] (set up un/secure data channel).",
        }
    }
}

/// One control-channel line split into its verb and argument.
///
/// The argument keeps inner whitespace so file names containing spaces
/// survive intact; only the CRLF terminator is stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub verb: String,
    pub command: Option<FtpCommand>,
    pub arg: String,
}

impl CommandLine {
    pub fn parse(line: &str) -> CommandLine {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb, arg),
            None => (line, ""),
        };
        let verb = verb.to_ascii_uppercase();
        CommandLine {
            command: FtpCommand::from_str(&verb),
            verb,
            arg: arg.to_string(),
        }
    }

    /// The line as it should appear in logs, with passwords masked.
    pub fn loggable(&self) -> String {
        match self.command {
            Some(FtpCommand::PASS) => "PASS ******".to_string(),
            _ if self.arg.is_empty() => self.verb.clone(),
            _ => format!("{} {}", self.verb, self.arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_spaces_in_argument() {
        let line = CommandLine::parse("stor my report.txt\r\n");
        assert_eq!(line.verb, "STOR");
        assert_eq!(line.command, Some(FtpCommand::STOR));
        assert_eq!(line.arg, "my report.txt");
    }

    #[test]
    fn test_parse_without_argument() {
        let line = CommandLine::parse("PWD\r\n");
        assert_eq!(line.command, Some(FtpCommand::PWD));
        assert_eq!(line.arg, "");
    }

    #[test]
    fn test_aliases_map_to_modern_verbs() {
        assert_eq!(FtpCommand::from_str("xmkd"), Some(FtpCommand::MKD));
        assert_eq!(FtpCommand::from_str("XCUP"), Some(FtpCommand::CDUP));
        assert_eq!(FtpCommand::from_str("XPWD"), Some(FtpCommand::PWD));
    }

    #[test]
    fn test_unknown_verb() {
        let line = CommandLine::parse("FOO bar");
        assert_eq!(line.command, None);
        assert_eq!(line.verb, "FOO");
    }

    #[test]
    fn test_every_command_has_name_and_syntax() {
        for command in FtpCommand::ALL {
            assert_eq!(FtpCommand::from_str(command.as_str()), Some(command));
            assert!(command.syntax().starts_with(command.as_str()));
        }
    }

    #[test]
    fn test_usage_lines() {
        assert_eq!(FtpCommand::ABOR.syntax(), "ABOR (abort transfer).");
        assert_eq!(
            FtpCommand::AUTH.syntax(),
            "AUTH <SP> TLS|SSL (set up secure control channel)."
        );
        assert_eq!(FtpCommand::from_str("rest"), Some(FtpCommand::REST));
        assert_eq!(FtpCommand::from_str("MFMT"), Some(FtpCommand::MFMT));
    }

    #[test]
    fn test_password_is_masked() {
        let line = CommandLine::parse("PASS secret");
        assert_eq!(line.loggable(), "PASS ******");
    }
}
