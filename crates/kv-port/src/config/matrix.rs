//! # Capability Matrix
//!
//! The six capability flags and their default-if-undefined resolution.
//!
//! This file is compiled twice: by `build.rs`, which resolves the flags for
//! the target and writes the result to `OUT_DIR`, and as part of the library,
//! which reads that result back. It must depend on `core`/`std` only.
//!
//! ## Resolution Contract
//!
//! | Pre-definition | Resolved value |
//! |----------------|----------------|
//! | defined to `n != 0` | `n` (enabled) |
//! | defined to `0` | `0` (disabled) |
//! | not defined | `0` (disabled) |
//!
//! Flags are resolved independently of each other; resolution has no
//! failure mode.

use std::fmt;

// =============================================================================
// CAPABILITY
// =============================================================================

/// A platform primitive or linked library the engine may take advantage of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// `fdatasync(2)`: flush file data without forcing a metadata update.
    Fdatasync = 0,
    /// `fcntl(F_FULLFSYNC)`: flush all the way to the physical medium.
    Fullfsync = 1,
    /// `O_CLOEXEC`: atomic close-on-exec at file creation.
    OCloexec = 2,
    /// Hardware-accelerated CRC32C implementation is linked in.
    Crc32c = 3,
    /// Snappy block compression is linked in.
    Snappy = 4,
    /// Zstd block compression is linked in.
    Zstd = 5,
}

impl Capability {
    /// Number of capabilities in the matrix.
    pub const COUNT: usize = 6;

    /// Every capability, in matrix order.
    pub const ALL: [Capability; Capability::COUNT] = [
        Capability::Fdatasync,
        Capability::Fullfsync,
        Capability::OCloexec,
        Capability::Crc32c,
        Capability::Snappy,
        Capability::Zstd,
    ];

    /// Position of this capability in the matrix.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of the build definition that pre-defines this capability.
    pub const fn define_name(self) -> &'static str {
        match self {
            Capability::Fdatasync => "HAVE_FDATASYNC",
            Capability::Fullfsync => "HAVE_FULLFSYNC",
            Capability::OCloexec => "HAVE_O_CLOEXEC",
            Capability::Crc32c => "HAVE_CRC32C",
            Capability::Snappy => "HAVE_SNAPPY",
            Capability::Zstd => "HAVE_ZSTD",
        }
    }

    /// Name of the `cfg` emitted when this capability resolves enabled.
    pub const fn cfg_name(self) -> &'static str {
        match self {
            Capability::Fdatasync => "have_fdatasync",
            Capability::Fullfsync => "have_fullfsync",
            Capability::OCloexec => "have_o_cloexec",
            Capability::Crc32c => "have_crc32c",
            Capability::Snappy => "have_snappy",
            Capability::Zstd => "have_zstd",
        }
    }

    /// Cargo feature that links the library backing this capability.
    ///
    /// `None` for operating-system primitives.
    pub const fn feature(self) -> Option<&'static str> {
        match self {
            Capability::Crc32c => Some("crc32c"),
            Capability::Snappy => Some("snappy"),
            Capability::Zstd => Some("zstd"),
            Capability::Fdatasync | Capability::Fullfsync | Capability::OCloexec => None,
        }
    }

    /// Whether this capability is an operating-system primitive.
    pub const fn is_os_primitive(self) -> bool {
        self.feature().is_none()
    }

    /// One-line description of what the capability provides.
    pub const fn summary(self) -> &'static str {
        match self {
            Capability::Fdatasync => "synchronized partial flush (fdatasync)",
            Capability::Fullfsync => "full device flush (F_FULLFSYNC)",
            Capability::OCloexec => "close-on-exec file creation (O_CLOEXEC)",
            Capability::Crc32c => "hardware-accelerated CRC32C",
            Capability::Snappy => "snappy block compression",
            Capability::Zstd => "zstd block compression",
        }
    }

    /// Look up a capability by its build definition name.
    pub fn from_define_name(name: &str) -> Option<Self> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.define_name() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.define_name())
    }
}

// =============================================================================
// RESOLVED VALUES
// =============================================================================

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Nothing defined the flag; the disabled default applied.
    Default,
    /// Target detection in the build step defined the flag.
    Probed,
    /// The builder pre-defined the flag (environment or Cargo feature).
    External,
}

impl Origin {
    /// Lowercase label used in reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Origin::Default => "default",
            Origin::Probed => "probed",
            Origin::External => "external",
        }
    }
}

/// The value a flag resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolved {
    /// Resolved integer value; nonzero means enabled.
    pub value: i64,
    /// Where the value came from.
    pub origin: Origin,
}

impl Resolved {
    /// The disabled default.
    pub const DISABLED: Resolved = Resolved {
        value: 0,
        origin: Origin::Default,
    };

    /// Whether the flag is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.value != 0
    }
}

/// Default-if-undefined resolution of a single flag.
pub const fn resolve(definition: Option<i64>) -> i64 {
    match definition {
        Some(value) => value,
        None => 0,
    }
}

/// Interpret a raw definition the way a compiler `-D` flag does.
///
/// An empty value defines the flag to `1`. Decimal and `0x`-prefixed hex
/// integers are accepted. Anything else is not a definition.
pub fn parse_definition(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(1);
    }

    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (digits, radix) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (unsigned, 10),
    };

    // `from_str_radix` takes its own sign; only one is allowed.
    if digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, radix).ok()?;

    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Whether a raw definition, if present, resolves enabled.
///
/// Absent, zero and unparseable values are all disabled.
pub fn definition_enabled(raw: Option<&str>) -> bool {
    raw.and_then(parse_definition).is_some_and(|value| value != 0)
}

// =============================================================================
// DEFINITIONS
// =============================================================================

/// Pre-definitions handed to resolution.
///
/// An external definition always wins over a probed one, whatever order
/// they are recorded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Definitions {
    slots: [Option<(i64, Origin)>; Capability::COUNT],
}

impl Definitions {
    /// No flag defined.
    pub const fn new() -> Self {
        Self {
            slots: [None; Capability::COUNT],
        }
    }

    /// Pre-define a flag on behalf of the builder.
    pub fn define(&mut self, capability: Capability, value: i64) -> &mut Self {
        self.slots[capability.index()] = Some((value, Origin::External));
        self
    }

    /// Record the result of target detection, unless the builder already
    /// defined the flag.
    pub fn probe(&mut self, capability: Capability, value: i64) -> &mut Self {
        let slot = &mut self.slots[capability.index()];
        if !matches!(slot, Some((_, Origin::External))) {
            *slot = Some((value, Origin::Probed));
        }
        self
    }

    /// Remove any definition of a flag.
    pub fn undefine(&mut self, capability: Capability) -> &mut Self {
        self.slots[capability.index()] = None;
        self
    }

    /// The value a flag is defined to, if any.
    pub fn get(&self, capability: Capability) -> Option<i64> {
        self.slots[capability.index()].map(|(value, _)| value)
    }

    /// Whether a flag carries a definition.
    pub fn is_defined(&self, capability: Capability) -> bool {
        self.slots[capability.index()].is_some()
    }

    /// Whether the builder (rather than detection) defined a flag.
    pub fn is_external(&self, capability: Capability) -> bool {
        matches!(self.slots[capability.index()], Some((_, Origin::External)))
    }

    /// Resolve every flag independently.
    pub fn resolve(&self) -> Matrix {
        let mut flags = [Resolved::DISABLED; Capability::COUNT];
        for capability in Capability::ALL {
            let slot = self.slots[capability.index()];
            flags[capability.index()] = Resolved {
                value: resolve(slot.map(|(value, _)| value)),
                origin: slot.map_or(Origin::Default, |(_, origin)| origin),
            };
        }
        Matrix { flags }
    }
}

// =============================================================================
// MATRIX
// =============================================================================

/// Six resolved capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix {
    flags: [Resolved; Capability::COUNT],
}

impl Matrix {
    /// Every flag disabled by default.
    pub const DISABLED: Matrix = Matrix {
        flags: [Resolved::DISABLED; Capability::COUNT],
    };

    /// Build a matrix from already-resolved flags in [`Capability::ALL`] order.
    pub const fn from_flags(flags: [Resolved; Capability::COUNT]) -> Self {
        Self { flags }
    }

    /// Resolved flag for a capability.
    pub const fn get(&self, capability: Capability) -> Resolved {
        self.flags[capability.index()]
    }

    /// Resolved integer value for a capability.
    pub const fn value(&self, capability: Capability) -> i64 {
        self.flags[capability.index()].value
    }

    /// Whether a capability is enabled.
    pub const fn is_enabled(&self, capability: Capability) -> bool {
        self.flags[capability.index()].is_enabled()
    }

    /// Enabled capabilities, in matrix order.
    pub fn enabled(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.is_enabled(*cap))
    }

    /// `(capability, resolved)` pairs, in matrix order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, Resolved)> + '_ {
        Capability::ALL
            .into_iter()
            .map(move |cap| (cap, self.get(cap)))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::DISABLED
    }
}
