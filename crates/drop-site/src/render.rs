//! HTML rendering.
//!
//! Pages are plain server-rendered HTML. Every piece of content-controlled
//! text goes through [`escape`].

use drop_chain::Address;
use drop_mint::{MintButton, MintState, NotificationKind, Toast};

use crate::routes::{mint_path, session_path};

/// Seconds between self-refreshes while the supply is loading.
pub const LOADING_REFRESH_SECS: u32 = 2;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `"13 / 21 NFT'S claimed"`.
pub fn claimed_label(claimed: u64, total: u128) -> String {
    format!("{} / {} NFT'S claimed", claimed, total)
}

/// Text of the mint button.
pub fn button_label(button: &MintButton) -> String {
    match button {
        MintButton::Loading => "Loading...".to_string(),
        MintButton::SoldOut => "SOLD OUT".to_string(),
        MintButton::SignIn => "Sign in to Mint".to_string(),
        MintButton::Mint { price, symbol } => format!("Mint NFT ({} {})", price, symbol),
        MintButton::Unavailable => "Unavailable".to_string(),
    }
}

/// Banner shown while a wallet is connected.
pub fn wallet_banner(address: &Address) -> String {
    format!("You're logged in with wallet {}", address.short())
}

/// One card on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCard {
    pub href: String,
    pub title: String,
    pub description: String,
    pub image_alt: String,
    /// `None` when the collection has no main image.
    pub image_url: Option<String>,
}

/// Everything the detail page shows.
#[derive(Debug, Clone)]
pub struct DetailView<'a> {
    pub brand: &'a str,
    pub slug: &'a str,
    pub title: &'a str,
    pub collection_name: &'a str,
    pub description: &'a str,
    pub preview_image_url: Option<String>,
    pub main_image_url: Option<String>,
    pub address: Option<Address>,
    pub state: &'a MintState,
    pub toasts: &'a [Toast],
    /// A contract is attached, so a loading supply will eventually settle.
    pub contract_attached: bool,
}

fn page(title: &str, extra_head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n{}</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        extra_head,
        body
    )
}

fn image_tag(class: &str, url: Option<&str>, alt: &str) -> String {
    match url {
        Some(url) => format!(
            "<img class=\"{}\" src=\"{}\" alt=\"{}\">\n",
            class,
            escape(url),
            escape(alt)
        ),
        None => String::new(),
    }
}

/// The collection listing.
pub fn render_listing(brand: &str, cards: &[CollectionCard]) -> String {
    let mut body = format!("<h1 class=\"brand\">{}</h1>\n<main class=\"collections\">\n", escape(brand));
    if cards.is_empty() {
        body.push_str("<p class=\"empty\">No collections yet.</p>\n");
    }
    for card in cards {
        body.push_str(&format!("<a class=\"card\" href=\"{}\">\n", escape(&card.href)));
        body.push_str(&image_tag("card-image", card.image_url.as_deref(), &card.image_alt));
        body.push_str(&format!(
            "<div class=\"card-body\">\n<h2>{}</h2>\n<p>{}</p>\n</div>\n</a>\n",
            escape(&card.title),
            escape(&card.description)
        ));
    }
    body.push_str("</main>\n");
    page(brand, "", &body)
}

fn render_toasts(toasts: &[Toast]) -> String {
    if toasts.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"toasts\">\n");
    for toast in toasts {
        out.push_str(&format!(
            "<li class=\"toast toast-{}\">{}</li>\n",
            toast.kind.as_str(),
            escape(&toast.message)
        ));
    }
    out.push_str("</ul>\n");
    out
}

/// A collection's mint page.
pub fn render_detail(view: &DetailView<'_>) -> String {
    let state = view.state;
    let address = view.address.as_ref();

    let mut left = String::from("<section class=\"drop-preview\">\n");
    left.push_str(&image_tag(
        "preview-image",
        view.preview_image_url.as_deref(),
        "logo",
    ));
    left.push_str(&format!(
        "<h1>{}</h1>\n<h2>{}</h2>\n</section>\n",
        escape(view.collection_name),
        escape(view.description)
    ));

    let session_label = if address.is_some() { "Sign Out" } else { "Sign In" };
    let mut right = format!(
        "<section class=\"drop-mint\">\n<header>\n<a href=\"/\"><h1 class=\"brand\">{}</h1></a>\n\
         <form method=\"post\" action=\"{}\"><button class=\"session\" type=\"submit\">{}</button></form>\n\
         </header>\n<hr>\n",
        escape(view.brand),
        escape(&session_path(view.slug)),
        session_label
    );
    if let Some(address) = address {
        // hex address and fixed text only
        right.push_str(&format!("<p class=\"wallet\">{}</p>\n", wallet_banner(address)));
    }
    right.push_str(&render_toasts(view.toasts));

    right.push_str("<div class=\"drop-content\">\n");
    right.push_str(&image_tag(
        "main-image",
        view.main_image_url.as_deref(),
        "nft pic",
    ));
    right.push_str(&format!("<h1>{}</h1>\n", escape(view.title)));
    match state.error_message() {
        Some(message) => right.push_str(&format!(
            "<p class=\"claimed error\">Could not load supply: {}</p>\n",
            escape(message)
        )),
        None if state.loading() && state.total_supply == 0 => {
            right.push_str("<p class=\"claimed loading\">Loading Supply Count ...</p>\n")
        }
        None => right.push_str(&format!(
            "<p class=\"claimed\">{}</p>\n",
            claimed_label(state.claimed, state.total_supply)
        )),
    }
    right.push_str("</div>\n");

    let button = state.button(address);
    let disabled = if state.can_mint(address) { "" } else { " disabled" };
    right.push_str(&format!(
        "<form method=\"post\" action=\"{}\"><button class=\"mint\" type=\"submit\"{}>{}</button></form>\n\
         </section>\n",
        escape(&mint_path(view.slug)),
        disabled,
        escape(&button_label(&button))
    ));

    let loading_toast = view
        .toasts
        .iter()
        .any(|t| t.kind == NotificationKind::Loading);
    let refresh = if (state.loading() && view.contract_attached) || loading_toast {
        format!(
            "<meta http-equiv=\"refresh\" content=\"{}\">\n",
            LOADING_REFRESH_SECS
        )
    } else {
        String::new()
    };

    page(view.title, &refresh, &format!("{}{}", left, right))
}

/// The 404 page.
pub fn render_not_found(brand: &str) -> String {
    page(
        "Not Found",
        "",
        &format!(
            "<h1>404</h1>\n<p>This page could not be found.</p>\n<a href=\"/\">{}</a>\n",
            escape(brand)
        ),
    )
}

/// The 500 page.
pub fn render_server_error(brand: &str) -> String {
    page(
        "Error",
        "",
        &format!(
            "<h1>500</h1>\n<p>Something went wrong loading this page.</p>\n<a href=\"/\">{}</a>\n",
            escape(brand)
        ),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use drop_mint::{MintPhase, NotificationHandle};

    use super::*;

    fn ready(claimed: u64, total: u128) -> MintState {
        MintState {
            phase: MintPhase::Ready,
            claimed,
            total_supply: total,
            price: Some("0.01".to_string()),
            currency_symbol: Some("ETH".to_string()),
        }
    }

    fn view<'a>(state: &'a MintState, address: Option<Address>, toasts: &'a [Toast]) -> DetailView<'a> {
        DetailView {
            brand: "NFT Market Place",
            slug: "apes",
            title: "Bored Apes",
            collection_name: "APES",
            description: "Apes & friends",
            preview_image_url: Some("https://cdn.example/preview.png".to_string()),
            main_image_url: Some("https://cdn.example/main.png".to_string()),
            address,
            state,
            toasts,
            contract_attached: true,
        }
    }

    fn account() -> Address {
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<script>alert(\"x\" & 'y')</script>"),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#39;y&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_claimed_label() {
        assert_eq!(claimed_label(13, 21), "13 / 21 NFT'S claimed");
    }

    #[test]
    fn test_button_labels() {
        assert_eq!(button_label(&MintButton::Loading), "Loading...");
        assert_eq!(button_label(&MintButton::SoldOut), "SOLD OUT");
        assert_eq!(button_label(&MintButton::SignIn), "Sign in to Mint");
        assert_eq!(
            button_label(&MintButton::Mint {
                price: "0.01".to_string(),
                symbol: "ETH".to_string()
            }),
            "Mint NFT (0.01 ETH)"
        );
    }

    #[test]
    fn test_wallet_banner() {
        assert_eq!(
            wallet_banner(&account()),
            "You're logged in with wallet 0x709...c79c8"
        );
    }

    #[test]
    fn test_listing_links_cards() {
        let cards = vec![CollectionCard {
            href: "/nft/apes".to_string(),
            title: "Apes <3".to_string(),
            description: "desc".to_string(),
            image_alt: "APES".to_string(),
            image_url: Some("https://cdn.example/a.png?w=1&h=2".to_string()),
        }];
        let html = render_listing("NFT Market Place", &cards);

        assert!(html.contains("<a class=\"card\" href=\"/nft/apes\">"));
        assert!(html.contains("<h2>Apes &lt;3</h2>"));
        assert!(html.contains("src=\"https://cdn.example/a.png?w=1&amp;h=2\""));
        assert!(!html.contains("No collections yet."));
    }

    #[test]
    fn test_detail_ready_connected() {
        let state = ready(13, 21);
        let html = render_detail(&view(&state, Some(account()), &[]));

        assert!(html.contains("<p class=\"claimed\">13 / 21 NFT'S claimed</p>"));
        assert!(html.contains("Mint NFT (0.01 ETH)</button>"));
        assert!(!html.contains(" disabled>"));
        assert!(html.contains("Sign Out"));
        assert!(html.contains("You're logged in with wallet 0x709...c79c8"));
        assert!(html.contains("action=\"/nft/apes/mint\""));
        assert!(html.contains("Apes &amp; friends"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_detail_signed_out() {
        let state = ready(13, 21);
        let html = render_detail(&view(&state, None, &[]));

        assert!(html.contains(">Sign In</button>"));
        assert!(html.contains(" disabled>Sign in to Mint</button>"));
        assert!(!html.contains("logged in with wallet"));
    }

    #[test]
    fn test_detail_loading_refreshes() {
        let state = MintState::new();
        let html = render_detail(&view(&state, Some(account()), &[]));

        assert!(html.contains("Loading Supply Count"));
        assert!(html.contains(" disabled>Loading...</button>"));
        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"2\">"));
    }

    #[test]
    fn test_detail_without_contract_does_not_refresh() {
        let state = MintState::new();
        let mut detail = view(&state, None, &[]);
        detail.contract_attached = false;
        let html = render_detail(&detail);

        assert!(html.contains(" disabled>Loading...</button>"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_detail_sold_out() {
        let state = ready(21, 21);
        let html = render_detail(&view(&state, Some(account()), &[]));
        assert!(html.contains(" disabled>SOLD OUT</button>"));
    }

    #[test]
    fn test_detail_error_state() {
        let mut state = MintState::new();
        state.phase = MintPhase::Error("rpc <down>".to_string());
        let html = render_detail(&view(&state, Some(account()), &[]));

        assert!(html.contains("Could not load supply: rpc &lt;down&gt;"));
        assert!(html.contains(" disabled>Unavailable</button>"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_detail_toasts() {
        let state = ready(13, 21);
        let toasts = vec![Toast {
            handle: NotificationHandle(1),
            kind: NotificationKind::Success,
            message: "HOORAY.. You Successfully Minted!".to_string(),
            expires_at: Some(Instant::now()),
        }];
        let html = render_detail(&view(&state, Some(account()), &toasts));
        assert!(html.contains(
            "<li class=\"toast toast-success\">HOORAY.. You Successfully Minted!</li>"
        ));
    }

    #[test]
    fn test_error_pages() {
        assert!(render_not_found("Brand").contains("<h1>404</h1>"));
        assert!(render_server_error("Brand").contains("<h1>500</h1>"));
    }
}
