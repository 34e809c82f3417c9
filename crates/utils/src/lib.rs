use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Random alphanumeric string, used for secrets that are generated when
/// none was configured.
pub fn create_random_secret(secret_len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(secret_len)
        .map(char::from)
        .collect()
}
