pub mod cors;

#[cfg(test)]
pub mod fake_upstream;
