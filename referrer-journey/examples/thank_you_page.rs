//! Thank-you page example showing the journey from settings to render decision.
//!
//! This example evaluates a journey the way a checkout extension would on each
//! render, then prints what the render gate decides for the shopper and for
//! the checkout editor.
//!
//! # Running this example
//!
//! ```bash
//! export MM_PARTNER_CODE=<your partner code>
//! cargo run --example thank_you_page
//! ```
//!
//! Leave `MM_PARTNER_CODE` unset to see the editor diagnostic instead.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::uninlined_format_args,
    clippy::use_debug,
    reason = "examples are allowed to use println and simple formatting"
)]

use std::env;

use referrer_journey::{
    HttpEntryPointFetcher, JourneyError, MerchantConfig, ReferrerJourney, RenderDecision,
    context::ExtensionSurface, host::HostContext,
};

fn describe(decision: &RenderDecision) -> String {
    match decision {
        RenderDecision::Suppressed => "nothing".to_owned(),
        RenderDecision::DiagnosticBanner(text) => format!("warning banner: {}", text),
        RenderDecision::Skeleton => "loading skeleton".to_owned(),
        RenderDecision::Populated(offer) => format!(
            "offer \"{}\" -> {} ({})",
            offer.headline,
            offer.url,
            offer.privacy_notice_link_text_or_default()
        ),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Referrer Journey: Thank-you Page Example\n");

    let settings = MerchantConfig {
        partner_code: env::var("MM_PARTNER_CODE").ok(),
        environment: Some("demo".to_owned()),
    };

    match settings.validated() {
        Ok(config) => println!("Using partner {} on {}", config.partner_code(), config.environment()),
        Err(JourneyError::InvalidPartnerCode) => {
            println!("MM_PARTNER_CODE not set; the shopper will see nothing");
        }
        Err(e) => println!("Unexpected settings error: {}", e),
    }

    let host = HostContext::new("example.myshopify.com", ExtensionSurface::ThankYou, "en", "GBP")
        .with_country("GB")
        .with_order_id("gid://shopify/OrderIdentity/1001");
    let journey = ReferrerJourney::new(HttpEntryPointFetcher::new()?);

    journey.evaluate_host(settings, &host, ExtensionSurface::ThankYou);
    println!("\nFirst render:  {}", describe(&journey.render(&host)));

    journey.subscribe().wait_for(|snapshot| !snapshot.loading).await;

    println!("\nShopper sees: {}", describe(&journey.render(&host)));
    println!("Editor sees:  {}", describe(&journey.render(&host.clone().in_editor())));
    println!(
        "B2B buyer:    {}",
        describe(&journey.render(&host.with_purchasing_company("gid://shopify/Company/7")))
    );

    Ok(())
}
