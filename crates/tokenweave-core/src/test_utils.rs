// ABOUTME: Shared token and theme fixtures for the engine's unit tests
// ABOUTME: Ratios noted beside each slot are against its background at full opacity

use crate::document::{ThemeDocument, TokenDocument};
use crate::token_index::TokenIndex;
use serde_json::json;

pub fn sample_tokens() -> TokenDocument {
    TokenDocument::new(json!({
        "colors": {
            "scale-01": {
                "alias": "neutral",
                "000": { "$value": "#ffffff" },
                "100": { "$value": "#f5f5f0" },
                "500": { "$value": "#767676" },
                "900": { "$value": "#212121" },
                "1000": { "$value": "#000000" }
            },
            "scale-02": {
                "alias": "amber",
                "300": { "$value": "#ffda6a" },
                "500": { "$value": "#ffc107" },
                "700": { "$value": "#cc9a06" }
            },
            "scale-05": {
                "alias": "cornflower",
                "100": { "$value": "#cfe2ff" },
                "300": { "$value": "#336699" },
                "500": { "$value": "#0d6efd" },
                "700": { "$value": "#0a58ca" },
                "900": { "$value": "#052c65" }
            }
        },
        "opacity": {
            "high": { "$value": "87%" },
            "low": { "$value": "0.6" }
        },
        "dimensions": {
            "spacing": { "sm": { "$value": "8px" } }
        }
    }))
}

pub fn sample_index() -> TokenIndex {
    TokenIndex::build(&sample_tokens())
}

/// Light-only theme where every pair passes 4.5:1
pub fn sample_theme() -> ThemeDocument {
    ThemeDocument::new(json!({
        "themes": {
            "light": {
                "interactive": { "$value": "{tokens.colors.scale-05.700}" },
                "palettes": {
                    "core-colors": {
                        "white": {
                            "tone": { "$value": "{tokens.colors.scale-01.000}" },
                            // 16.1
                            "on-tone": { "$value": "{tokens.colors.scale-01.900}" },
                            // 6.4
                            "interactive": { "$value": "{tokens.colors.scale-05.700}" }
                        },
                        "primary": {
                            "tone": { "$value": "{tokens.colors.cornflower.700}" },
                            "on-tone": { "$value": "{brand.themes.palettes.core-colors.white.tone}" },
                            "interactive": { "$value": "{tokens.colors.scale-01.000}" }
                        },
                        "warning": {
                            "tone": { "$value": "{tokens.colors.amber.500}" },
                            // 12.9
                            "on-tone": { "$value": "{tokens.colors.scale-01.1000}" }
                        }
                    }
                },
                "text": {
                    "high-emphasis": { "$value": "{tokens.opacity.high}" }
                },
                "layers": {
                    "layer-0": {
                        "surface": { "$value": "{tokens.colors.scale-01.000}" },
                        "element-interactive": { "$value": "{tokens.colors.scale-05.700}" }
                    },
                    "layer-1": {
                        "surface": { "$value": "{tokens.colors.scale-01.100}" },
                        // 5.9
                        "element-interactive": { "$value": "{tokens.colors.scale-05.700}" }
                    }
                }
            }
        }
    }))
}

/// Dark theme whose only layer needs a lighter interactive color
pub fn dark_theme() -> ThemeDocument {
    ThemeDocument::new(json!({
        "themes": {
            "dark": {
                "interactive": { "$value": "{tokens.colors.scale-05.700}" },
                "palettes": { "core-colors": {} },
                "layers": {
                    "layer-0": {
                        "surface": { "$value": "{tokens.colors.scale-01.900}" },
                        "element-interactive": { "$value": "{tokens.colors.scale-05.300}" }
                    }
                }
            }
        }
    }))
}

/// Light theme where `sky` follows white but cannot keep it once white darkens
pub fn white_follower_theme() -> ThemeDocument {
    ThemeDocument::new(json!({
        "themes": {
            "light": {
                "palettes": {
                    "core-colors": {
                        "white": {
                            "tone": { "$value": "{tokens.colors.scale-01.000}" },
                            "on-tone": { "$value": "{tokens.colors.scale-01.900}" }
                        },
                        "sky": {
                            "tone": { "$value": "{tokens.colors.scale-05.700}" },
                            // 6.4 while white is #ffffff
                            "on-tone": { "$value": "{brand.palettes.core-colors.white.tone}" }
                        },
                        "warning": {
                            "tone": { "$value": "{tokens.colors.amber.500}" },
                            "on-tone": { "$value": "{tokens.colors.scale-01.1000}" }
                        }
                    }
                }
            }
        }
    }))
}
