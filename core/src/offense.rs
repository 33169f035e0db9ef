use std::fmt::{Display, Formatter};
use std::ops::{BitOr, BitOrAssign};

/// A combinable set of defect categories attached to one file.
///
/// Offenses accumulate over the scan: a file can carry several at once
/// (e.g. duplicate and low entropy). Union is idempotent and the type is
/// a plain value, so records can grow their set without bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offense(u8);

impl Offense {
    /// The file did not open or decode.
    pub const CORRUPT: Offense = Offense(1);
    /// The decoded color mode differs from the expected one.
    pub const MODE: Offense = Offense(1 << 1);
    /// The file is a (near) duplicate of an earlier cluster member.
    pub const DUPLICATE: Offense = Offense(1 << 2);
    /// The dimensions are not the expected square.
    pub const SIZE: Offense = Offense(1 << 3);
    /// The information content is below the configured threshold.
    pub const ENTROPY: Offense = Offense(1 << 4);

    pub fn empty() -> Self {
        Offense(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Checks whether every category in `other` is present in `self`.
    pub fn contains(self, other: Offense) -> bool {
        self.0 & other.0 == other.0
    }

    /// Names of the categories present, in a fixed order.
    pub fn names(self) -> Vec<&'static str> {
        const TABLE: [(Offense, &str); 5] = [
            (Offense::CORRUPT, "corrupt"),
            (Offense::MODE, "mode"),
            (Offense::DUPLICATE, "duplicate"),
            (Offense::SIZE, "size"),
            (Offense::ENTROPY, "entropy"),
        ];
        TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for Offense {
    type Output = Offense;

    fn bitor(self, rhs: Offense) -> Offense {
        Offense(self.0 | rhs.0)
    }
}

impl BitOrAssign for Offense {
    fn bitor_assign(&mut self, rhs: Offense) {
        self.0 |= rhs.0;
    }
}

impl Display for Offense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        write!(f, "{}", self.names().join("|"))
    }
}
