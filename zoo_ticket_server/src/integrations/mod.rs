pub mod ticketing;
