pub mod loan;
pub mod tax;
