
#[cfg(test)]
mod invite_tests;
#[cfg(test)]
mod rate_limit_tests;
