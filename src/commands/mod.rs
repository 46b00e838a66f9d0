// Reconciliation commands
pub mod run;
