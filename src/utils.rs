use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::SkippedLinkRow;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value echoed back by the provider to tie the callback to this run.
pub fn generate_csrf_state() -> String {
    random_alphanumeric(32)
}

pub fn short_link(video_id: &str) -> String {
    format!("https://youtu.be/{video_id}")
}

/// Numbers the skipped links for the summary table, starting at 1.
pub fn skipped_link_rows(failed: &[String]) -> Vec<SkippedLinkRow> {
    failed
        .iter()
        .enumerate()
        .map(|(i, link)| SkippedLinkRow {
            position: i + 1,
            link: link.clone(),
        })
        .collect()
}
