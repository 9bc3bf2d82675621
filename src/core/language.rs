//! Language settings shared by every toolchain.
//!
//! These are the semantic knobs (standard, warnings, optimization) that each
//! toolchain spells differently on its command line.

use serde::{Deserialize, Serialize};

/// C++ standard version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CppStandard {
    /// C++11
    #[serde(rename = "11", alias = "c++11", alias = "cpp11")]
    Cpp11,
    /// C++14
    #[serde(rename = "14", alias = "c++14", alias = "cpp14")]
    Cpp14,
    /// C++17
    #[serde(rename = "17", alias = "c++17", alias = "cpp17")]
    Cpp17,
    /// C++20
    #[serde(rename = "20", alias = "c++20", alias = "cpp20")]
    Cpp20,
    /// C++23
    #[serde(rename = "23", alias = "c++23", alias = "cpp23")]
    Cpp23,
    /// Newest standard the compiler knows about
    #[serde(rename = "latest", alias = "c++latest")]
    Latest,
}

impl Default for CppStandard {
    fn default() -> Self {
        CppStandard::Cpp20
    }
}

impl CppStandard {
    /// Get the standard as a GNU-style flag value (e.g., "c++17").
    pub fn as_flag_value(&self) -> &'static str {
        match self {
            CppStandard::Cpp11 => "c++11",
            CppStandard::Cpp14 => "c++14",
            CppStandard::Cpp17 => "c++17",
            CppStandard::Cpp20 => "c++20",
            CppStandard::Cpp23 => "c++23",
            // gcc >= 11 and clang >= 12 accept the C++23 draft spelling
            CppStandard::Latest => "c++2b",
        }
    }

    /// Get the MSVC-style standard flag value (e.g., "c++17", "c++latest" for C++23).
    pub fn as_msvc_flag_value(&self) -> &'static str {
        match self {
            CppStandard::Cpp11 => "c++14", // MSVC doesn't support c++11 flag, use 14
            CppStandard::Cpp14 => "c++14",
            CppStandard::Cpp17 => "c++17",
            CppStandard::Cpp20 => "c++20",
            CppStandard::Cpp23 | CppStandard::Latest => "c++latest",
        }
    }
}

/// How loudly the compiler should complain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    /// Suppress warnings
    Off,
    /// Compiler defaults
    Default,
    /// Common warning set
    All,
    /// Common warnings plus strict conformance
    #[default]
    Pedantic,
}

/// Optimization level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OptLevel {
    #[serde(rename = "0")]
    O0,
    #[serde(rename = "1")]
    O1,
    #[default]
    #[serde(rename = "2")]
    O2,
    #[serde(rename = "3")]
    O3,
    /// Optimize for size
    #[serde(rename = "s")]
    Size,
}
