//! Built-in contract prose for the regular and campfire agreements.

use super::numerals::content_count_text;
use crate::models::{ContractFields, ContractVariant};

/// A paragraph of rendered contract text.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub text: String,
    pub bold: bool,
    /// Blank lines after the paragraph.
    pub space_after: u8,
}

impl Block {
    fn line(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            space_after: 0,
        }
    }

    fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            space_after: 1,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            space_after: 0,
        }
    }
}

const RESTRICTED_CATEGORY: &str = "Beginning on the Effective Date, and concluding thirty (30) days after Vendor's publication of the video(s) with Adobe's authorization, Vendor will not provide services on behalf of, appear or participate in any advertising, publicity or promotion of, endorse, or authorize or permit the use of Vendor's Likeness in connection with the following (the \"Restricted Category\"): (a) any software and online creative development and cloud service companies (for clarity, the Restricted Category includes, without limitation, Spline, Womp, Canva, Affinity, CapCut, Autodesk, DaVinci, Final Cut Pro, Figma, Procreate, Capture One Pro); or (b) any product or service that in its advertising or publicity denigrates Adobe or its products. For clarity, the aforementioned does not preclude Vendor from merely appearing in any entertainment portion of any news, TV, or film program or attending an event, regardless of sponsorship.";

const USAGE_RIGHTS: &str = "For clarity, Adobe shall have the right to like, favorite, share, repost, redistribute, syndicate, amplify (paid promotion or allow listing) or otherwise use all video described hereunder in any manner enabled by the applicable platform. Adobe can use the video and may redistribute to other Adobe owned accounts, channels, and/or platforms. Vendor will allow 1 round of edits per video.";

const PRO_RATA: &str = "In the event that all pre-recorded video(s) are not delivered, Adobe will pay a pro-rated rate for content delivered in accordance with this Agreement.";

/// Paragraphs of the contract for `fields`, in document order.
pub fn compose(fields: &ContractFields) -> Vec<Block> {
    let variant = fields.variant();
    let count = content_count_text(fields.number_of_content.as_deref());

    let mut blocks = vec![
        Block::line(format!("Artist/vendor name: {}", fields.contractor_name)),
        Block::line(format!(
            "Name of person signing the contract (if not the artist/vendor): {}",
            fields.signer_name
        )),
        Block::line(format!(
            "Relationship to artist/vendor: {}",
            fields.relationship_to_vendor
        )),
        Block::line(format!("Address: {}", fields.address)),
        Block::line(format!("Email address: {}", fields.email)),
        Block::paragraph(format!("Vendor account: {}", fields.vendor_account)),
        Block::heading("Summary:"),
        Block::paragraph(format!(
            "Vendor will create and provide to Adobe {} video(s) with content to promote select Adobe products.",
            count
        )),
        Block::heading("Deliverables:"),
        Block::paragraph(format!(
            "Vendor will provide Adobe with {} pre-recorded video(s) that will be between 30 seconds and one minute in length that highlight Adobe products. Specific details, including Adobe product(s), will be selected by Adobe in writing. For each video, Vendor will (1) orally disclose the relationship between Vendor and Adobe and (2) include a clearly visible written overlay disclosing the relationship. Unless otherwise specified by Adobe in writing, each video's aspect ratio will be 9:16.",
            count
        )),
    ];

    match variant {
        ContractVariant::Regular => {
            blocks.push(Block::paragraph(
                "Vendor will post the video(s) on various social media channels owned and controlled by the Vendor, which the parties will agree to in writing. [The video(s) must be authenticated via the CreatorIQ website for analytic purposes, with a 30-day Ad code for all video created on applicable social media platforms provided to Adobe to track performance.]",
            ));
            blocks.push(Block::paragraph(USAGE_RIGHTS));
            blocks.push(Block::paragraph(PRO_RATA));
            blocks.push(Block::paragraph(RESTRICTED_CATEGORY));
        }
        ContractVariant::Campfire => {
            blocks.push(Block::paragraph(
                "Vendor will post the video(s) on various social media channels owned and controlled by the Vendor, which the parties will agree to in writing. The video(s) must include a 30-day Ad code for all video created on applicable social media platforms provided to Adobe.",
            ));
        }
    }

    blocks.push(Block::heading("Delivery Schedule:"));
    blocks.push(Block::paragraph(format!(
        "Unless otherwise directed in writing by Adobe, {}",
        fields.due_date
    )));

    let price = match variant {
        ContractVariant::Regular => format!("Price and currency: ${} USD", fields.amount),
        ContractVariant::Campfire => format!("Price and currency: ${}", fields.amount),
    };
    blocks.push(Block::line(price));
    if let Some(po) = &fields.po {
        blocks.push(Block::line(format!("Purchase order: {}", po)));
    }
    blocks.push(Block::line(format!("End Date: {}", fields.end_date)));

    blocks
}

/// Turns filled template text into paragraphs: one per non-blank line, blank
/// lines adding space after the previous paragraph.
pub fn blocks_from_text(text: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if let Some(last) = blocks.last_mut() {
                last.space_after = last.space_after.saturating_add(1);
            }
        } else {
            blocks.push(Block::line(line.trim_end()));
        }
    }
    blocks
}
