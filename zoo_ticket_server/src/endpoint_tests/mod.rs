mod helpers;
mod mocks;
mod orders;
mod payment;
