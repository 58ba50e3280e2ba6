//! # Preview
//!
//! Composition of the active document's text and the confirmed signature into one view. Holds no state
//! of its own - edits made through the preview go straight back to the
//! [editor](crate::editor::WillEditor::edit_content).

use crate::document::Document;
use crate::signature::RasterizedSignature;

pub const TITLE: &str = "數位遺產遺囑";
pub const SUBTITLE: &str = "最後遺囑";
/// Shown in place of empty document text.
pub const CONTENT_PLACEHOLDER: &str = "在此輸入您的遺囑內容...";
/// Shown in the signature band before a signature is confirmed.
pub const UNSIGNED_PLACEHOLDER: &str = "尚未簽署";
pub const SIGNATURE_CAPTION: &str = "立遺囑人簽名 (在此處簽名)";
pub const TIMESTAMP_NOTICE: &str = "文件已於區塊鏈上記錄時間戳";

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SignatureBand<'a> {
    Signed(&'a RasterizedSignature),
    Unsigned,
}

#[derive(Clone, Copy, Debug)]
pub struct Preview<'a> {
    pub document: &'a Document,
    pub signature: SignatureBand<'a>,
}
impl<'a> Preview<'a> {
    #[must_use]
    pub fn compose(document: &'a Document, signature: Option<&'a RasterizedSignature>) -> Self {
        Self {
            document,
            signature: signature.map_or(SignatureBand::Unsigned, SignatureBand::Signed),
        }
    }
    /// Text for the body area. Falls back to the placeholder when empty.
    #[must_use]
    pub fn body(&self) -> &'a str {
        if self.document.text_content.is_empty() {
            CONTENT_PLACEHOLDER
        } else {
            &self.document.text_content
        }
    }
    /// Can the body area be typed into?
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.document.editable
    }
    #[must_use]
    pub fn is_signed(&self) -> bool {
        matches!(self.signature, SignatureBand::Signed(_))
    }
    /// Lay the preview out as plain text, for hosts with no image surface.
    #[must_use]
    pub fn render_text(&self) -> String {
        use std::fmt::Write;
        const RULE: &str = "────────────────────────";
        const DASHED: &str = "- - - - - - - - - - - - ";

        let mut out = String::new();
        // Writing to a String can't fail.
        let _ = writeln!(out, "{TITLE}");
        let _ = writeln!(out, "{SUBTITLE}");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "{}", self.body());
        let _ = writeln!(out, "{DASHED}");
        match self.signature {
            SignatureBand::Signed(signature) => {
                let [width, height] = signature.dimensions();
                let _ = writeln!(
                    out,
                    "[signature {width}x{height}, {}]",
                    human_bytes::human_bytes(signature.png().len() as f64)
                );
            }
            SignatureBand::Unsigned => {
                let _ = writeln!(out, "{UNSIGNED_PLACEHOLDER}");
            }
        }
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "{SIGNATURE_CAPTION}");
        let _ = writeln!(out, "{TIMESTAMP_NOTICE}");
        out
    }
}
