//! # Blocks
//!
//! One block type serves all five tiers. The tier-specific part is the
//! [`BlockBody`]: a Page carries a free-form record, every higher tier
//! carries references to the blocks it aggregates.
//!
//! ## Hash Input
//!
//! SHA-256 over the canonical JSON of
//! `{index, previous_hash, timestamp, <body field>, validator, signature}`
//! where the body field is `data` (the record) for Pages and `pages` /
//! `chapters` / `books` / `parts` (the list of child hashes only) for the
//! aggregate tiers.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use shared_types::{canonical_json, Hash256, Payload, Timestamp};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// TIERS
// =============================================================================

/// The five block tiers, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Page,
    Chapter,
    Book,
    Part,
    Series,
}

impl Tier {
    /// All tiers, finest first.
    pub const ALL: [Tier; 5] = [Tier::Page, Tier::Chapter, Tier::Book, Tier::Part, Tier::Series];

    /// Aggregate tiers in rollup order.
    pub const AGGREGATES: [Tier; 4] = [Tier::Chapter, Tier::Book, Tier::Part, Tier::Series];

    /// The tier this tier aggregates, if any.
    pub fn child_tier(self) -> Option<Tier> {
        match self {
            Tier::Page => None,
            Tier::Chapter => Some(Tier::Page),
            Tier::Book => Some(Tier::Chapter),
            Tier::Part => Some(Tier::Book),
            Tier::Series => Some(Tier::Part),
        }
    }

    /// Name of the tier's sequence in the chain file.
    pub fn collection(self) -> &'static str {
        match self {
            Tier::Page => "pages",
            Tier::Chapter => "chapters",
            Tier::Book => "books",
            Tier::Part => "parts",
            Tier::Series => "series",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Page => "page",
            Tier::Chapter => "chapter",
            Tier::Book => "book",
            Tier::Part => "part",
            Tier::Series => "series",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.name() == lowered || tier.collection() == lowered)
            .ok_or_else(|| format!("unknown tier: {}", s))
    }
}

// =============================================================================
// BODY
// =============================================================================

/// Reference from an aggregate block to one of its children.
///
/// Only `hash` feeds the parent's hash; `index` is the rollup cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub index: u64,
    pub hash: Hash256,
}

/// Tier-specific block content.
///
/// Flattened into the block, so the variant name becomes the JSON key:
/// `"data": {...}` for a Page, `"pages": [...]` for a Chapter and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockBody {
    Data(Payload),
    Pages(Vec<ChildRef>),
    Chapters(Vec<ChildRef>),
    Books(Vec<ChildRef>),
    Parts(Vec<ChildRef>),
}

impl BlockBody {
    /// Aggregate body for `tier`; `None` for the Page tier.
    pub fn aggregate(tier: Tier, children: Vec<ChildRef>) -> Option<Self> {
        match tier {
            Tier::Page => None,
            Tier::Chapter => Some(BlockBody::Pages(children)),
            Tier::Book => Some(BlockBody::Chapters(children)),
            Tier::Part => Some(BlockBody::Books(children)),
            Tier::Series => Some(BlockBody::Parts(children)),
        }
    }

    /// The tier a block with this body belongs to.
    pub fn tier(&self) -> Tier {
        match self {
            BlockBody::Data(_) => Tier::Page,
            BlockBody::Pages(_) => Tier::Chapter,
            BlockBody::Chapters(_) => Tier::Book,
            BlockBody::Books(_) => Tier::Part,
            BlockBody::Parts(_) => Tier::Series,
        }
    }

    /// JSON key of the body in the stored block and in the hash input.
    pub fn field(&self) -> &'static str {
        match self {
            BlockBody::Data(_) => "data",
            BlockBody::Pages(_) => "pages",
            BlockBody::Chapters(_) => "chapters",
            BlockBody::Books(_) => "books",
            BlockBody::Parts(_) => "parts",
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            BlockBody::Data(payload) => Some(payload),
            _ => None,
        }
    }

    /// Child references; empty for a Page.
    pub fn children(&self) -> &[ChildRef] {
        match self {
            BlockBody::Data(_) => &[],
            BlockBody::Pages(children)
            | BlockBody::Chapters(children)
            | BlockBody::Books(children)
            | BlockBody::Parts(children) => children,
        }
    }

    fn hash_input(&self) -> Value {
        match self {
            BlockBody::Data(payload) => Value::Object(payload.clone()),
            _ => Value::Array(
                self.children()
                    .iter()
                    .map(|child| Value::String(child.hash.to_hex()))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// BLOCK
// =============================================================================

/// A block of any tier.
///
/// The hash is computed once by [`Block::new`]. Blocks loaded from storage
/// keep the hash they were stored with; [`Block::has_valid_hash`] detects
/// tampering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    previous_hash: Hash256,
    timestamp: Timestamp,
    #[serde(flatten)]
    body: BlockBody,
    validator: String,
    signature: String,
    hash: Hash256,
}

impl Block {
    /// Build a block and compute its hash.
    pub fn new(
        index: u64,
        previous_hash: Hash256,
        timestamp: Timestamp,
        body: BlockBody,
        validator: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        let validator = validator.into();
        let signature = signature.into();
        let hash = compute_hash(index, &previous_hash, &timestamp, &body, &validator, &signature);
        Self {
            index,
            previous_hash,
            timestamp,
            body,
            validator,
            signature,
            hash,
        }
    }

    /// Build a Page.
    pub fn page(
        index: u64,
        previous_hash: Hash256,
        timestamp: Timestamp,
        data: Payload,
        validator: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self::new(index, previous_hash, timestamp, BlockBody::Data(data), validator, signature)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn previous_hash(&self) -> &Hash256 {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn body(&self) -> &BlockBody {
        &self.body
    }

    pub fn tier(&self) -> Tier {
        self.body.tier()
    }

    /// The record of a Page.
    pub fn data(&self) -> Option<&Payload> {
        self.body.payload()
    }

    pub fn children(&self) -> &[ChildRef] {
        self.body.children()
    }

    pub fn validator(&self) -> &str {
        &self.validator
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn hash(&self) -> &Hash256 {
        &self.hash
    }

    /// Reference to this block for a parent aggregate.
    pub fn as_child(&self) -> ChildRef {
        ChildRef {
            index: self.index,
            hash: self.hash,
        }
    }

    /// Hash recomputed from the block's current fields.
    pub fn recompute_hash(&self) -> Hash256 {
        compute_hash(
            self.index,
            &self.previous_hash,
            &self.timestamp,
            &self.body,
            &self.validator,
            &self.signature,
        )
    }

    pub fn has_valid_hash(&self) -> bool {
        self.recompute_hash() == self.hash
    }

    /// The record a Page's signature covers; `None` for aggregate tiers.
    pub fn signing_payload(&self) -> Option<Value> {
        self.data().map(|data| {
            page_signing_payload(self.index, &self.previous_hash, &self.timestamp, data, &self.validator)
        })
    }
}

/// The record signed by a Page author: `{index, previous_hash, timestamp, data, validator}`.
pub fn page_signing_payload(
    index: u64,
    previous_hash: &Hash256,
    timestamp: &Timestamp,
    data: &Payload,
    validator: &str,
) -> Value {
    json!({
        "index": index,
        "previous_hash": previous_hash.to_hex(),
        "timestamp": timestamp.as_str(),
        "data": Value::Object(data.clone()),
        "validator": validator,
    })
}

fn compute_hash(
    index: u64,
    previous_hash: &Hash256,
    timestamp: &Timestamp,
    body: &BlockBody,
    validator: &str,
    signature: &str,
) -> Hash256 {
    let mut record = Map::new();
    record.insert("index".into(), json!(index));
    record.insert("previous_hash".into(), json!(previous_hash.to_hex()));
    record.insert("timestamp".into(), json!(timestamp.as_str()));
    record.insert(body.field().into(), body.hash_input());
    record.insert("validator".into(), json!(validator));
    record.insert("signature".into(), json!(signature));
    Hash256::digest(&canonical_json(&Value::Object(record)))
}
