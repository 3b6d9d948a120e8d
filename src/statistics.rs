pub mod pmf;
