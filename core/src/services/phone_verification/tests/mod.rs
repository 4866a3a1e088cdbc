mod bootstrap_tests;
mod cooldown_tests;
mod mocks;
