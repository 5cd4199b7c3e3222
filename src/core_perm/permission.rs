use crate::core_perm::error::PermissionError;
use std::fmt;
use std::str::FromStr;

/// One class of FTP commands a user may be allowed to run.
///
/// Each capability is configured with the single letter used by classic
/// FTP server permission strings (`elradfmwMT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ChangeDir,
    List,
    Retrieve,
    Append,
    Delete,
    Rename,
    MakeDir,
    Store,
    Chmod,
    SetTime,
}

impl Capability {
    /// Every capability, in the order of the canonical permission string.
    pub const ALL: [Capability; 10] = [
        Capability::ChangeDir,
        Capability::List,
        Capability::Retrieve,
        Capability::Append,
        Capability::Delete,
        Capability::Rename,
        Capability::MakeDir,
        Capability::Store,
        Capability::Chmod,
        Capability::SetTime,
    ];

    pub fn letter(self) -> char {
        match self {
            Capability::ChangeDir => 'e',
            Capability::List => 'l',
            Capability::Retrieve => 'r',
            Capability::Append => 'a',
            Capability::Delete => 'd',
            Capability::Rename => 'f',
            Capability::MakeDir => 'm',
            Capability::Store => 'w',
            Capability::Chmod => 'M',
            Capability::SetTime => 'T',
        }
    }

    pub fn from_letter(letter: char) -> Option<Capability> {
        Capability::ALL.into_iter().find(|cap| cap.letter() == letter)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ChangeDir => "CHANGE_DIR",
            Capability::List => "LIST",
            Capability::Retrieve => "RETRIEVE",
            Capability::Append => "APPEND",
            Capability::Delete => "DELETE",
            Capability::Rename => "RENAME",
            Capability::MakeDir => "MAKE_DIR",
            Capability::Store => "STORE",
            Capability::Chmod => "CHMOD",
            Capability::SetTime => "SET_TIME",
        };
        f.write_str(name)
    }
}

/// A set of capabilities stored as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(u16);

impl Permissions {
    pub fn empty() -> Self {
        Permissions(0)
    }

    pub fn all() -> Self {
        Capability::ALL
            .into_iter()
            .fold(Permissions::empty(), Permissions::with)
    }

    pub fn with(self, capability: Capability) -> Self {
        Permissions(self.0 | capability.bit())
    }

    pub fn without(self, capability: Capability) -> Self {
        Permissions(self.0 & !capability.bit())
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }
}

impl FromStr for Permissions {
    type Err = PermissionError;

    /// Parses a permission string such as `"elr"`; repeated letters are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars().try_fold(Permissions::empty(), |perms, letter| {
            Capability::from_letter(letter)
                .map(|cap| perms.with(cap))
                .ok_or(PermissionError::UnknownLetter(letter))
        })
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cap in Capability::ALL {
            if self.contains(cap) {
                write!(f, "{}", cap.letter())?;
            }
        }
        Ok(())
    }
}
