//! Error Types
//!
//! This module defines the error type shared by every Marionette crate.
//!
//! # Overview
//!
//! [`MarionetteError`] covers three families of failure:
//! - Malformed assets, reported once at load time. A model that fails here
//!   is never partially constructed.
//! - Precondition violations during playback (a time query outside the
//!   clip, an unknown bone or instance, a wrongly sized output buffer).
//!   These are programmer errors, surfaced as explicit results instead of
//!   being clamped away.
//! - I/O and format errors from the asset loaders.
//!
//! All fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, MarionetteError>`.

use thiserror::Error;

/// The main error type for Marionette.
#[derive(Error, Debug)]
pub enum MarionetteError {
    // ========================================================================
    // Malformed Asset Errors
    // ========================================================================
    /// The imported scene has no root node.
    #[error("Malformed asset: scene has no root node")]
    MissingRootNode,

    /// A keyframe sequence that needs at least one key has none.
    #[error("Malformed asset: {property} keys of node '{node}' are empty")]
    EmptyKeyframes {
        /// Animated node name
        node: String,
        /// "position", "rotation" or "scale"
        property: &'static str,
    },

    /// Keyframe timestamps go backwards or are not finite.
    #[error("Malformed asset: {property} keys of node '{node}' are out of order at key {index}")]
    UnsortedKeyframes {
        /// Animated node name
        node: String,
        /// "position", "rotation" or "scale"
        property: &'static str,
        /// Index of the first key whose time is smaller than its predecessor
        index: usize,
    },

    /// A multi-key sequence stops before the clip does, so part of the clip
    /// could not be sampled.
    #[error("Malformed asset: {property} keys of node '{node}' end at {end}, clip runs to {duration}")]
    TrackEndsEarly {
        /// Animated node name
        node: String,
        /// "position", "rotation" or "scale"
        property: &'static str,
        /// Time of the last key
        end: f32,
        /// Clip duration in ticks
        duration: f32,
    },

    /// A cubic-spline sequence without one tangent pair per key.
    #[error("Malformed asset: {property} keys of node '{node}' have {tangents} tangent pairs for {keys} keys")]
    MissingTangents {
        /// Animated node name
        node: String,
        /// "position", "rotation" or "scale"
        property: &'static str,
        keys: usize,
        tangents: usize,
    },

    /// The clip duration is zero, negative or not finite.
    #[error("Malformed asset: invalid animation duration {0}")]
    InvalidDuration(f32),

    /// A node was attached to a parent that does not exist in the tree.
    #[error("Malformed asset: parent node of '{0}' is not in the tree")]
    UnknownParentNode(String),

    /// A bone weight refers to a vertex the mesh does not have.
    #[error("Malformed asset: bone '{bone}' weights vertex {vertex} of a {vertex_count}-vertex model")]
    VertexOutOfRange {
        /// Bone name
        bone: String,
        /// Global vertex index
        vertex: u32,
        /// Number of vertices over all meshes
        vertex_count: u32,
    },

    /// Vertex or index totals do not fit the 32-bit buffer offsets.
    #[error("Malformed asset: mesh '{0}' overflows 32-bit vertex or index offsets")]
    MeshTooLarge(String),

    /// Requested animation does not exist in the asset.
    #[error("Animation index out of bounds: {index} (asset has {count})")]
    AnimationIndexOutOfBounds {
        /// The requested index
        index: usize,
        /// Number of animations available
        count: usize,
    },

    /// Placement matrix file could not be parsed.
    #[error("Placement track parse error: {0}")]
    PlacementParse(String),

    /// glTF parsing or decoding error.
    #[error("glTF error: {0}")]
    Gltf(String),

    // ========================================================================
    // Precondition Violations
    // ========================================================================
    /// Animation time outside the valid range. Callers must wrap time into
    /// `[start, end)` before sampling.
    #[error("Animation time {time} is outside [{start}, {end})")]
    TimeOutOfRange {
        /// The requested time in ticks
        time: f32,
        /// Inclusive lower bound
        start: f32,
        /// Exclusive upper bound
        end: f32,
    },

    /// Lookup of a bone name that was never registered.
    #[error("Unknown bone: {0}")]
    UnknownBone(String),

    /// Caller-supplied output buffer has the wrong length.
    #[error("Output buffer holds {actual} matrices, expected {expected}")]
    BufferSizeMismatch {
        /// Number of registered bones
        expected: usize,
        /// Length of the supplied slice
        actual: usize,
    },

    /// A transform query was made on a model without an animation clip.
    #[error("Model '{0}' has no animation attached")]
    NoAnimation(String),

    /// Instance id that is not (or no longer) managed by the pool.
    #[error("Unknown instance: {0}")]
    UnknownInstance(String),

    /// Model id that was never added to the crowd.
    #[error("Unknown model: {0}")]
    UnknownModel(usize),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, MarionetteError>`.
pub type Result<T> = std::result::Result<T, MarionetteError>;
