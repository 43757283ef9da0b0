//! Collision-safe stored filenames.
//!
//! Senders routinely attach several files with the same name (`invoice.pdf`), so every stored
//! name carries a short random token: `<base>-<token>.<extension>`. The base is the text before
//! the first period and the extension is the text after the last one, so `report.final.pdf`
//! becomes `report-<token>.pdf`.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

const TOKEN_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const FALLBACK_BASE: &str = "attachment";

static UNSAFE_CHARS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Unsafe character pattern must compile."));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameParts<'a> {
	pub base: &'a str,
	pub extension: Option<&'a str>,
}

pub fn split_filename(name: &str) -> FilenameParts<'_> {
	match (name.split_once('.'), name.rsplit_once('.')) {
		(Some((base, _)), Some((_, extension))) => FilenameParts { base, extension: Some(extension) },
		_ => FilenameParts { base: name, extension: None },
	}
}

/// Drops every character that is unsafe in a storage path or awkward to display.
pub fn strip_special_characters(input: &str) -> String {
	UNSAFE_CHARS.replace_all(input, "").into_owned()
}

/// Builds the stored filename for `original` using the given disambiguation token.
///
/// A name without a period is stored extension-less as `<base>-<token>`. A base that is empty
/// once sanitized falls back to `attachment`.
pub fn compose_stored_filename(original: &str, token: &str) -> String {
	let parts = split_filename(original.trim());
	let base = strip_special_characters(parts.base);
	let base = if base.is_empty() { FALLBACK_BASE } else { base.as_str() };
	let extension = parts.extension.map(strip_special_characters).filter(|ext| !ext.is_empty());
	let composed = match extension {
		Some(extension) => format!("{base}-{token}.{extension}"),
		None => format!("{base}-{token}"),
	};

	strip_special_characters(&composed)
}

/// Generates an alphanumeric token of `len` characters.
pub fn random_token(len: usize) -> String {
	let mut token = String::with_capacity(len);

	while token.len() < len {
		let uuid = Uuid::new_v4();
		// Bytes 6 and 8 carry the v4 version and variant bits.
		let random = uuid.as_bytes().iter().enumerate().filter(|(idx, _)| *idx != 6 && *idx != 8);

		for (_, byte) in random.take(len - token.len()) {
			token.push(TOKEN_ALPHABET[usize::from(*byte) % TOKEN_ALPHABET.len()] as char);
		}
	}

	token
}
