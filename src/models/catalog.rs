// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed option lists offered by the form.
//!
//! Each option serializes to a stable snake_case id; `label()` is the text
//! shown in the UI and embedded into generated prompts.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Declare a closed option list with stable ids and display labels.
macro_rules! catalog {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $id:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "binding-generation", derive(TS))]
        #[cfg_attr(
            feature = "binding-generation",
            ts(export, export_to = "web/src/lib/generated/")
        )]
        pub enum $name {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable identifier used in storage.
            pub fn id(&self) -> &'static str {
                match self {
                    $($name::$variant => $id,)+
                }
            }

            /// Human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Look up an option by its stable id.
            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

catalog! {
    /// Broad education sector the material is made for.
    pub enum EducationField {
        K12 => "k12", "General Education (K-12)";
        Preschool => "preschool", "Early Childhood Education (Preschool)";
        HigherEducation => "higher_education", "Higher Education & College";
        Vocational => "vocational", "Vocational Training";
        Corporate => "corporate", "Corporate Training";
        SpecialEducation => "special_education", "Special Education";
        Other => "other", "Other field";
    }
}

impl Default for EducationField {
    fn default() -> Self {
        EducationField::K12
    }
}

catalog! {
    /// Kind of teaching material to produce.
    pub enum MaterialType {
        Infographic => "infographic", "Infographic";
        Worksheet => "worksheet", "Worksheet";
        Poster => "poster", "Educational poster";
        Comic => "comic", "Comic / Manga";
        Flashcard => "flashcard", "Flashcards";
        Mindmap => "mindmap", "Mind map";
    }
}

catalog! {
    /// Learner group the material targets.
    pub enum TargetAudience {
        Preschool => "preschool", "Preschool";
        Primary => "primary", "Primary school";
        Secondary => "secondary", "Lower secondary school";
        HighSchool => "high_school", "High school";
        University => "university", "University";
        Other => "other", "Other (describe the audience...)";
    }
}

catalog! {
    /// Visual style presets.
    pub enum VisualStyle {
        CutePastel => "cute_pastel", "Cute Pastel (soft pastel colours, friendly)";
        ClassicalVietnam => "classical_vietnam", "Classical Vietnam (rustic, rich in Vietnamese culture)";
        Academic => "academic", "Academic Education (clear structure, knowledge focused)";
        Doodle => "doodle", "Hand-Drawn Doodle (natural strokes, playful)";
        FlatDesign => "flat_design", "Flat Design (minimal, modern, easy to read)";
        Anime => "anime", "Anime (youthful, dynamic, eye-catching)";
        Graphic3d => "graphic_3d", "3D Graphics (volume, realistic depth)";
        Vintage => "vintage", "Vintage (nostalgic, historic, formal)";
        Gradient => "gradient", "Gradient Modern (smooth colour transitions)";
        Interactive => "interactive", "Interactive (encourages learner interaction)";
        Realistic => "realistic", "Realistic (photographic)";
        Sketch => "sketch", "Hand-drawn Sketch (pencil)";
        Watercolor => "watercolor", "Watercolor";
        PixelArt => "pixel_art", "Pixel Art (8-bit game style)";
        InfographicVector => "infographic_vector", "Infographic Vector (professional)";
        Minimalist => "minimalist", "Minimalist";
        Isometric => "isometric", "Isometric 3D";
        LineArt => "line_art", "Line Art (simple, suitable for colouring)";
        PaperCut => "paper_cut", "Paper Cutout";
        Claymation => "claymation", "Claymation";
        Other => "other", "Other (describe your own style...)";
    }
}

catalog! {
    /// Optional layout features that can be toggled on the draft.
    pub enum Feature {
        FillBlank => "fill_blank", "Blank spaces for students to fill in";
        Mascot => "mascot", "Character mascot illustration";
        Charts => "charts", "Charts and data";
        Summary => "summary", "Summary box at the bottom of the page";
        RelevantVisuals => "relevant_visuals", "Relevant illustrations and icons";
    }
}

catalog! {
    /// Output page size / aspect ratio.
    pub enum Dimension {
        A4Portrait => "a4_portrait", "A4 portrait (21 x 29.7 cm) - standard worksheet print";
        A4Landscape => "a4_landscape", "A4 landscape (29.7 x 21 cm) - tables, mind maps";
        A3Portrait => "a3_portrait", "A3 portrait (29.7 x 42 cm) - large poster";
        Widescreen => "widescreen", "16:9 landscape (1920x1080px) - slides/screen";
        Story => "story", "9:16 portrait (1080x1920px) - phone/story";
        Square => "square", "1:1 square (1080x1080px) - social media";
        TallInfographic => "tall_infographic", "Tall infographic (800x2000px) - web/mobile scroll";
        A5 => "a5", "A5 (14.8 x 21 cm) - notebook/flyer";
    }
}

catalog! {
    /// Requested render quality.
    pub enum ImageQuality {
        FullHd => "full_hd", "Full HD (1920 x 1080 px) - Standard";
        Qhd => "qhd", "2K QHD (2560 x 1440 px) - High Detail";
        Uhd4k => "uhd_4k", "4K UHD (3840 x 2160 px) - Print Ready";
        Uhd8k => "uhd_8k", "8K (7680 x 4320 px) - Ultra Detail";
    }
}

impl Default for ImageQuality {
    fn default() -> Self {
        ImageQuality::FullHd
    }
}

catalog! {
    /// Language of any text rendered inside the material.
    pub enum ContentLanguage {
        Vietnamese => "vi", "Vietnamese";
        English => "en", "English";
        Bilingual => "en_vi", "Bilingual English-Vietnamese";
        French => "fr", "French";
        Japanese => "ja", "Japanese";
        Korean => "ko", "Korean";
        Chinese => "zh", "Chinese";
        NoText => "none", "No text";
    }
}

impl Default for ContentLanguage {
    fn default() -> Self {
        ContentLanguage::Vietnamese
    }
}

/// Subjects suggested for K-12 drafts and the profile.
pub const COMMON_SUBJECTS: &[&str] = &[
    "Mathematics",
    "Literature",
    "Vietnamese",
    "English",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Geography",
    "Civic Education",
    "Informatics",
    "Technology",
    "Fine Arts",
    "Music",
    "Natural Sciences",
    "Experiential Activities",
    "Physical Education",
    "Defence Education",
];
