mod utils;

mod encrypt;
mod key_set;
mod malformed;
mod nested;
mod plain;
mod sign;
mod tamper;
