//! Render gate.
//!
//! Maps a [`JourneySnapshot`] and two host flags to what the extension should
//! show. The function is pure: it neither logs nor reports, so it can run on
//! every frame. Failures were already logged when the journey transitioned.
//!
//! # Precedence
//!
//! First match wins:
//!
//! 1. B2B purchase → [`RenderDecision::Suppressed`]
//! 2. Invalid environment or partner code → banner in editor, else suppressed
//! 3. Fetch error → banner in editor, else suppressed
//! 4. Loading → [`RenderDecision::Skeleton`]
//! 5. No entry point → suppressed
//! 6. Otherwise → [`RenderDecision::Populated`]

use crate::{config::ConfigValidation, entry_point::EntryPointResponse, journey::JourneySnapshot};

/// Banner shown in the editor when no environment is configured.
pub const ENVIRONMENT_NOT_SET_BANNER: &str = "Mention Me environment not set. Visit the Mention Me \
                                              app settings in Shopify to choose an environment.";

/// Banner shown in the editor when no partner code is configured.
pub const PARTNER_CODE_NOT_SET_BANNER: &str = "Mention Me partner code needs to be set to show \
                                               Mention Me journey. Visit the Mention Me app \
                                               settings in Shopify to set the partner code.";

/// Prefix of the banner shown in the editor when the fetch failed.
pub const LOAD_FAILED_BANNER_PREFIX: &str = "Failed to load Mention Me journey: ";

/// What the extension renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    /// Render nothing.
    Suppressed,
    /// Merchant-facing warning, only ever produced in editor context.
    DiagnosticBanner(String),
    /// Placeholder while the entry point loads.
    Skeleton,
    /// The referral offer.
    Populated(EntryPointResponse),
}

impl RenderDecision {
    /// Returns true if nothing is rendered.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

/// Decides what to render.
///
/// # Examples
///
/// ```
/// use referrer_journey::{
///     journey::JourneySnapshot,
///     render::{ENVIRONMENT_NOT_SET_BANNER, RenderDecision, decide},
/// };
///
/// let snapshot = JourneySnapshot { partner_code: Some("mm-partner".into()), ..Default::default() };
///
/// assert_eq!(
///     decide(&snapshot, true, false),
///     RenderDecision::DiagnosticBanner(ENVIRONMENT_NOT_SET_BANNER.to_owned())
/// );
/// assert_eq!(decide(&snapshot, false, false), RenderDecision::Suppressed);
/// ```
#[must_use]
pub fn decide(
    snapshot: &JourneySnapshot,
    is_editor_context: bool,
    is_b2b_purchase: bool,
) -> RenderDecision {
    if is_b2b_purchase {
        return RenderDecision::Suppressed;
    }

    let config_banner = match snapshot.config_validation() {
        ConfigValidation::Valid => None,
        ConfigValidation::InvalidEnvironment => Some(ENVIRONMENT_NOT_SET_BANNER),
        ConfigValidation::InvalidPartnerCode => Some(PARTNER_CODE_NOT_SET_BANNER),
    };
    if let Some(banner) = config_banner {
        return editor_only(is_editor_context, || banner.to_owned());
    }

    if let Some(reason) = &snapshot.error_state {
        return editor_only(is_editor_context, || format!("{LOAD_FAILED_BANNER_PREFIX}{reason}"));
    }

    if snapshot.loading {
        return RenderDecision::Skeleton;
    }

    match &snapshot.referrer_entry_point_response {
        Some(response) => RenderDecision::Populated(response.clone()),
        None => RenderDecision::Suppressed,
    }
}

fn editor_only(is_editor_context: bool, banner: impl FnOnce() -> String) -> RenderDecision {
    if is_editor_context {
        RenderDecision::DiagnosticBanner(banner())
    } else {
        RenderDecision::Suppressed
    }
}


#[cfg(test)]
mod unit_tests {
    use super::*;

    fn response() -> EntryPointResponse {
        EntryPointResponse {
            headline: "Give £10, get £10".to_owned(),
            description: "Share with friends".to_owned(),
            image_url: Some("https://cdn.mention-me.com/offer.png".to_owned()),
            url: "https://mention-me.com/r/abc".to_owned(),
            default_call_to_action: "Refer now".to_owned(),
            privacy_notice: "Mention Me processes your data".to_owned(),
            privacy_notice_url: "https://mention-me.com/privacy".to_owned(),
            privacy_notice_link_text: None,
        }
    }

    fn configured() -> JourneySnapshot {
        JourneySnapshot {
            partner_code: Some("mm-partner".into()),
            environment: Some("production".into()),
            ..JourneySnapshot::default()
        }
    }

    #[test]
    fn test_b2b_wins_over_everything() {
        let snapshot = JourneySnapshot {
            referrer_entry_point_response: Some(response()),
            ..configured()
        };
        assert_eq!(decide(&snapshot, true, true), RenderDecision::Suppressed);
        assert_eq!(decide(&JourneySnapshot::default(), true, true), RenderDecision::Suppressed);
    }

    #[test]
    fn test_missing_partner_code_banner() {
        let snapshot = JourneySnapshot { partner_code: None, ..configured() };
        assert_eq!(
            decide(&snapshot, true, false),
            RenderDecision::DiagnosticBanner(PARTNER_CODE_NOT_SET_BANNER.to_owned())
        );
        assert!(decide(&snapshot, false, false).is_suppressed());
    }

    #[test]
    fn test_environment_banner_takes_precedence() {
        let snapshot = JourneySnapshot::default();
        assert_eq!(
            decide(&snapshot, true, false),
            RenderDecision::DiagnosticBanner(ENVIRONMENT_NOT_SET_BANNER.to_owned())
        );
    }

    #[test]
    fn test_error_banner_in_editor_only() {
        let snapshot = JourneySnapshot {
            error_state: Some("HTTP request failed: timed out".into()),
            ..configured()
        };
        assert_eq!(
            decide(&snapshot, true, false),
            RenderDecision::DiagnosticBanner(
                "Failed to load Mention Me journey: HTTP request failed: timed out".to_owned()
            )
        );
        assert_eq!(decide(&snapshot, false, false), RenderDecision::Suppressed);
    }

    #[test]
    fn test_loading_renders_skeleton() {
        let snapshot = JourneySnapshot { loading: true, ..configured() };
        assert_eq!(decide(&snapshot, false, false), RenderDecision::Skeleton);
        assert_eq!(decide(&snapshot, true, false), RenderDecision::Skeleton);
    }

    #[test]
    fn test_empty_result_is_suppressed() {
        assert_eq!(decide(&configured(), true, false), RenderDecision::Suppressed);
    }

    #[test]
    fn test_populated() {
        let snapshot = JourneySnapshot {
            referrer_entry_point_response: Some(response()),
            ..configured()
        };
        assert_eq!(decide(&snapshot, false, false), RenderDecision::Populated(response()));
    }
}
