use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::catalog::RuleCatalog;
use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result};
use crate::scanner::{self, ScanOptions};
use crate::variant::{Breakpoint, DARK_MODIFIER, PseudoClass, Variant, classify};

pub const RESET_CSS: &str = include_str!("reset.css");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub scan: ScanOptions,
    pub base_stylesheet: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub css: String,
    pub elapsed: Duration,
    pub files_scanned: usize,
    pub rule_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub css: String,
    pub rule_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs one full pass: discovery, tokenization, classification and assembly.
///
/// The base stylesheet is read fresh every time and nothing is cached between
/// passes.
pub fn generate(request: &GenerateRequest, catalog: &RuleCatalog) -> Result<GenerationResult> {
    let started = Instant::now();

    let files = scanner::discover(&request.scan)?;
    tracing::debug!(files = files.len(), "discovered candidate files");

    let mut diagnostics = Vec::new();
    let tokens = scanner::collect_tokens(&files, &mut diagnostics)?;

    let base_css =
        fs::read_to_string(&request.base_stylesheet).map_err(|source| Error::BaseStylesheet {
            path: request.base_stylesheet.clone(),
            source,
        })?;

    let assembly = assemble(tokens.iter().map(String::as_str), &base_css, catalog);
    diagnostics.extend(assembly.diagnostics);

    Ok(GenerationResult {
        css: assembly.css,
        elapsed: started.elapsed(),
        files_scanned: files.len(),
        rule_count: assembly.rule_count,
        diagnostics,
    })
}

/// Builds the stylesheet text: reset, then the base stylesheet, then one
/// fragment per supported token in byte-wise ascending token order.
pub fn assemble<'a, I>(tokens: I, base_css: &str, catalog: &RuleCatalog) -> Assembly
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = tokens.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut css = String::with_capacity(RESET_CSS.len() + base_css.len() + 64 * sorted.len());
    css.push_str(RESET_CSS);
    css.push('\n');
    css.push_str(base_css);
    css.push('\n');

    let mut rule_count = 0;
    let mut diagnostics = Vec::new();
    for token in sorted {
        let variant = classify(token, catalog);
        match build_fragment(&variant, catalog) {
            Some(fragment) => {
                css.push_str(&fragment);
                css.push('\n');
                rule_count += 1;
            }
            None => {
                if let Some(diagnostic) = diagnose(token, &variant) {
                    diagnostics.push(diagnostic.emit());
                }
            }
        }
    }

    Assembly {
        css,
        rule_count,
        diagnostics,
    }
}

/// Renders the CSS for one classified token, or `None` when it produces none.
pub fn build_fragment(variant: &Variant<'_>, catalog: &RuleCatalog) -> Option<String> {
    match *variant {
        Variant::Plain { name } => catalog.get(name).map(|rule| rule.css()),
        Variant::Breakpoint { breakpoint, base } => {
            build_breakpoint_rule(breakpoint, base, catalog)
        }
        Variant::PseudoClass { pseudo, base } => build_pseudo_class_rule(pseudo, base, catalog),
        Variant::Dark { base } => build_dark_rule(base, catalog),
        Variant::UnknownModifier { .. } | Variant::TooManySegments | Variant::NotInCatalog => None,
    }
}

fn diagnose(token: &str, variant: &Variant<'_>) -> Option<Diagnostic> {
    match *variant {
        Variant::TooManySegments => Some(Diagnostic::UnsupportedRule {
            token: token.to_string(),
        }),
        Variant::UnknownModifier { modifier, .. } => Some(Diagnostic::UnknownModifier {
            token: token.to_string(),
            modifier: modifier.to_string(),
        }),
        // Ordinary words from the scanned files; not worth a line each.
        Variant::NotInCatalog => None,
        Variant::Plain { .. }
        | Variant::Breakpoint { .. }
        | Variant::PseudoClass { .. }
        | Variant::Dark { .. } => None,
    }
}

fn escaped_class(modifier: &str, base: &str) -> String {
    format!(".{}\\:{}", modifier, base)
}

fn build_breakpoint_rule(
    breakpoint: Breakpoint,
    base: &str,
    catalog: &RuleCatalog,
) -> Option<String> {
    let rule = catalog.get(base)?;
    Some(format!(
        "@media(min-width:{}px){{{}{{{}}}}}",
        breakpoint.min_width_px(),
        escaped_class(breakpoint.name(), base),
        rule.declarations()
    ))
}

fn build_pseudo_class_rule(
    pseudo: PseudoClass,
    base: &str,
    catalog: &RuleCatalog,
) -> Option<String> {
    let rule = catalog.get(base)?;
    Some(format!(
        "{}:{}{{{}}}",
        escaped_class(pseudo.name(), base),
        pseudo.selector(),
        rule.declarations()
    ))
}

fn build_dark_rule(base: &str, catalog: &RuleCatalog) -> Option<String> {
    let rule = catalog.get(base)?;
    Some(format!(
        "@media(prefers-color-scheme:dark){{{}{{{}}}}}",
        escaped_class(DARK_MODIFIER, base),
        rule.declarations()
    ))
}
