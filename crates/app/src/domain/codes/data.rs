//! Code Data

use jiff::Timestamp;

use crate::domain::codes::records::CodeUuid;

/// Request to take unused codes out of the inventory for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeClaim {
    pub customer: String,
    pub quantity: u32,
    pub claimed_at: Timestamp,
}

/// Return previously claimed codes to the unused pool.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRelease {
    /// Customer the codes were claimed for; codes held by anyone else are left alone.
    pub customer: String,
    pub codes: Vec<CodeUuid>,
}

/// Raw codes supplied by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeUpload {
    pub codes: Vec<String>,
}

impl CodeUpload {
    /// Trimmed, non-blank codes with in-request duplicates removed, first occurrence wins.
    #[must_use]
    pub fn normalised(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::with_capacity(self.codes.len());

        self.codes
            .iter()
            .map(|code| code.trim())
            .filter(|code| !code.is_empty())
            .filter(|code| seen.insert(*code))
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// Outcome of a bulk upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    /// Distinct non-blank codes in the request.
    pub received: usize,

    /// Codes that did not exist before.
    pub inserted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeFilter {
    #[default]
    All,
    Unused,
}
