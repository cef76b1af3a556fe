//! Classification of tokens into plain rules and modifier variants.

use crate::catalog::RuleCatalog;

/// Responsive breakpoint modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breakpoint {
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
        Breakpoint::Xxl,
    ];

    pub fn from_modifier(modifier: &str) -> Option<Self> {
        match modifier {
            "sm" => Some(Self::Sm),
            "md" => Some(Self::Md),
            "lg" => Some(Self::Lg),
            "xl" => Some(Self::Xl),
            "2xl" => Some(Self::Xxl),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
            Self::Xxl => "2xl",
        }
    }

    pub fn min_width_px(self) -> u32 {
        match self {
            Self::Sm => 640,
            Self::Md => 768,
            Self::Lg => 1024,
            Self::Xl => 1280,
            Self::Xxl => 1536,
        }
    }
}

/// State modifiers that map onto a CSS pseudo-class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    Hover,
    First,
    Last,
    Active,
    Focus,
}

impl PseudoClass {
    pub fn from_modifier(modifier: &str) -> Option<Self> {
        match modifier {
            "hover" => Some(Self::Hover),
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            "active" => Some(Self::Active),
            "focus" => Some(Self::Focus),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::First => "first",
            Self::Last => "last",
            Self::Active => "active",
            Self::Focus => "focus",
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::First => "first-child",
            Self::Last => "last-child",
            Self::Active => "active",
            Self::Focus => "focus",
        }
    }
}

pub const DARK_MODIFIER: &str = "dark";

/// What a token turned out to be.
///
/// Only the first four kinds produce CSS. The remaining ones carry enough
/// context for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant<'a> {
    Plain {
        name: &'a str,
    },
    Breakpoint {
        breakpoint: Breakpoint,
        base: &'a str,
    },
    PseudoClass {
        pseudo: PseudoClass,
        base: &'a str,
    },
    Dark {
        base: &'a str,
    },
    /// Last segment is a catalog key but the modifier is not in any vocabulary.
    UnknownModifier {
        modifier: &'a str,
        base: &'a str,
    },
    /// More than one modifier (`a:b:c`).
    TooManySegments,
    NotInCatalog,
}

pub fn parse(token: &str) -> Vec<&str> {
    token.split(':').collect()
}

/// A token is supported when its last `:` segment names a catalog rule.
pub fn is_supported(token: &str, catalog: &RuleCatalog) -> bool {
    token
        .rsplit(':')
        .next()
        .is_some_and(|last| catalog.contains(last))
}

pub fn classify<'a>(token: &'a str, catalog: &RuleCatalog) -> Variant<'a> {
    if catalog.contains(token) {
        return Variant::Plain { name: token };
    }
    if !is_supported(token, catalog) {
        return Variant::NotInCatalog;
    }

    let segments = parse(token);
    let &[modifier, base] = segments.as_slice() else {
        return Variant::TooManySegments;
    };

    if let Some(breakpoint) = Breakpoint::from_modifier(modifier) {
        Variant::Breakpoint { breakpoint, base }
    } else if let Some(pseudo) = PseudoClass::from_modifier(modifier) {
        Variant::PseudoClass { pseudo, base }
    } else if modifier == DARK_MODIFIER {
        Variant::Dark { base }
    } else {
        Variant::UnknownModifier { modifier, base }
    }
}

#[cfg(test)]
mod tests {
    use super::{Breakpoint, PseudoClass, Variant, classify, is_supported, parse};
    use crate::catalog::RuleCatalog;

    fn catalog() -> RuleCatalog {
        RuleCatalog::from_entries([
            ("text-center", ".text-center{text-align:center}"),
            ("bg-black", ".bg-black{background-color:#000}"),
        ])
        .expect("catalog should build")
    }

    #[test]
    fn supported_iff_last_segment_is_a_key() {
        let catalog = catalog();
        assert!(is_supported("text-center", &catalog));
        assert!(is_supported("sm:text-center", &catalog));
        assert!(is_supported("a:b:text-center", &catalog));
        assert!(is_supported("foo:bg-black", &catalog));
        assert!(!is_supported("text-left", &catalog));
        assert!(!is_supported("text-center:sm", &catalog));
        assert!(!is_supported("sm:", &catalog));
        assert!(!is_supported("", &catalog));
    }

    #[test]
    fn parse_splits_on_every_colon() {
        assert_eq!(parse("text-center"), vec!["text-center"]);
        assert_eq!(parse("sm:text-center"), vec!["sm", "text-center"]);
        assert_eq!(parse("a::b"), vec!["a", "", "b"]);
    }

    #[test]
    fn full_token_key_is_plain() {
        let catalog = catalog();
        assert_eq!(
            classify("text-center", &catalog),
            Variant::Plain {
                name: "text-center"
            }
        );
    }

    #[test]
    fn plain_check_runs_before_colon_split() {
        let catalog = RuleCatalog::from_entries([
            ("a:b:c", ".a\\:b\\:c{color:red}"),
            ("c", ".c{color:blue}"),
        ])
        .expect("catalog should build");
        assert_eq!(classify("a:b:c", &catalog), Variant::Plain { name: "a:b:c" });
    }

    #[test]
    fn routes_breakpoints() {
        let catalog = catalog();
        for breakpoint in Breakpoint::ALL {
            let token = format!("{}:text-center", breakpoint.name());
            assert_eq!(
                classify(&token, &catalog),
                Variant::Breakpoint {
                    breakpoint,
                    base: "text-center"
                }
            );
        }
    }

    #[test]
    fn routes_pseudo_classes() {
        let catalog = catalog();
        assert_eq!(
            classify("first:bg-black", &catalog),
            Variant::PseudoClass {
                pseudo: PseudoClass::First,
                base: "bg-black"
            }
        );
        assert_eq!(PseudoClass::Last.selector(), "last-child");
        assert_eq!(PseudoClass::Hover.selector(), "hover");
    }

    #[test]
    fn routes_dark() {
        let catalog = catalog();
        assert_eq!(
            classify("dark:bg-black", &catalog),
            Variant::Dark { base: "bg-black" }
        );
    }

    #[test]
    fn more_than_two_segments_is_rejected() {
        let catalog = catalog();
        assert_eq!(
            classify("sm:hover:text-center", &catalog),
            Variant::TooManySegments
        );
    }

    #[test]
    fn unknown_modifier_is_reported_not_dropped() {
        let catalog = catalog();
        assert_eq!(
            classify("foo:bg-black", &catalog),
            Variant::UnknownModifier {
                modifier: "foo",
                base: "bg-black"
            }
        );
    }

    #[test]
    fn unsupported_tokens_are_not_in_catalog() {
        let catalog = catalog();
        assert_eq!(classify("div", &catalog), Variant::NotInCatalog);
        assert_eq!(classify("sm:text-left", &catalog), Variant::NotInCatalog);
    }

    #[test]
    fn breakpoint_widths() {
        let widths: Vec<u32> = Breakpoint::ALL.iter().map(|b| b.min_width_px()).collect();
        assert_eq!(widths, vec![640, 768, 1024, 1280, 1536]);
        assert_eq!(Breakpoint::from_modifier("2xl"), Some(Breakpoint::Xxl));
        assert_eq!(Breakpoint::from_modifier("3xl"), None);
    }
}
