//! Value objects for the verification domain

pub mod code_purpose;
pub mod issue_result;

pub use code_purpose::CodePurpose;
pub use issue_result::IssueResult;
