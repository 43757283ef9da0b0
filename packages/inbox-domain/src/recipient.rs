#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipientError {
	#[error("Recipient {address:?} has no @ separator.")]
	MissingSeparator { address: String },
	#[error("Recipient {address:?} has an empty local-part.")]
	EmptyLocalPart { address: String },
}

/// Returns the local-part of `localpart@domain`, the routing key for a tenant inbox.
///
/// The local-part is returned as written; tenant lookup is exact and case-sensitive.
pub fn inbox_local_part(address: &str) -> Result<&str, RecipientError> {
	let address = address.trim();
	let Some((local, _domain)) = address.split_once('@') else {
		return Err(RecipientError::MissingSeparator { address: address.to_string() });
	};

	if local.is_empty() {
		return Err(RecipientError::EmptyLocalPart { address: address.to_string() });
	}

	Ok(local)
}
