// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

//! Error taxonomy shared by every module.
//!
//! Each module keeps its own error enum; `kind()` on those enums maps a
//! concrete error onto one of the categories below so callers can decide how
//! to react without matching every variant.

use std::fmt;

/// Coarse classification of every error the crate can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value did not fit its 64- or 128-bit container.
    ArithmeticOverflow,
    /// `muldiv` was asked for an exact division that left a remainder.
    DivisionNotExact,
    /// Malformed textual input.
    ParseError,
    /// Input outside the domain of the operation (draining a pool, bad path...).
    DomainError,
    /// A collaborator (daemon, wallet, network) failed.
    ExternalFailure,
    /// Operation attempted in the wrong state.
    StateError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ArithmeticOverflow => "arithmetic overflow",
            ErrorKind::DivisionNotExact => "division not exact",
            ErrorKind::ParseError => "parse error",
            ErrorKind::DomainError => "domain error",
            ErrorKind::ExternalFailure => "external failure",
            ErrorKind::StateError => "state error",
        };
        f.write_str(s)
    }
}
