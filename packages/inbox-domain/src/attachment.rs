use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{filename, inbound::Attachment};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
	#[error("Attachment {name:?} is missing required field {field}.")]
	MissingField { name: String, field: &'static str },
	#[error("Attachment {name:?} content is not valid base64.")]
	Decode { name: String, source: base64::DecodeError },
}

/// A decoded attachment ready to be written under the tenant inbox prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedAttachment {
	pub original_name: String,
	pub stored_name: String,
	pub content_type: String,
	pub declared_length: Option<u64>,
	pub bytes: Vec<u8>,
}
impl ExtractedAttachment {
	pub fn size(&self) -> u64 {
		self.bytes.len() as u64
	}

	/// True when the provider declared a length that the decoded payload does not match.
	pub fn length_mismatch(&self) -> bool {
		self.declared_length.map(|declared| declared != self.size()).unwrap_or(false)
	}
}

/// Names, decodes and types one attachment.
///
/// `content_type` replaces whatever the sender declared.
pub fn extract(
	attachment: &Attachment,
	token: &str,
	content_type: &str,
) -> Result<ExtractedAttachment, ExtractError> {
	let name = attachment.name.as_deref().ok_or_else(|| ExtractError::MissingField {
		name: attachment.label().to_string(),
		field: "Name",
	})?;
	let content = attachment
		.content
		.as_deref()
		.ok_or_else(|| ExtractError::MissingField { name: name.to_string(), field: "Content" })?;
	let bytes = decode_content(content)
		.map_err(|err| ExtractError::Decode { name: name.to_string(), source: err })?;

	Ok(ExtractedAttachment {
		original_name: name.to_string(),
		stored_name: filename::compose_stored_filename(name, token),
		content_type: content_type.to_string(),
		declared_length: attachment.declared_length,
		bytes,
	})
}

pub fn decode_content(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
	if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
		let compact = encoded.chars().filter(|ch| !ch.is_ascii_whitespace()).collect::<String>();

		return STANDARD.decode(compact);
	}

	STANDARD.decode(encoded)
}
