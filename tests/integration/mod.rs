/// Integration test harness: drives the server end to end over a real database
mod basic_integration;
