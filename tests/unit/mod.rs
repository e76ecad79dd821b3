/// Unit test harness: exercises the public analytics and insight APIs
mod basic_tests;
