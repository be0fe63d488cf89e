//! Embed page rendering.
//!
//! The inline `<style>` and `<script>` blocks are generated once from the
//! layout constants and pinned in the content security policy by hash.

use std::sync::LazyLock;

use edge_security::{ContentHash, ContentSecurityPolicy, Directive, FrameAllowlist};

use crate::layout::LayoutParams;
use crate::stream::{ChatEntry, StreamRef, CLOSED_CHAT_URL};

/// Page title.
pub const TITLE: &str = "MultiChzzk.tv";

/// Example path shown on the help panel.
pub const EXAMPLE_PATH: &str = "/abcdef1234567890abcdef1234567890/twitch/a:afreeca/y:youtube-_id";

const STYLE_TEMPLATE: &str = r#"
			html,
			body {
				margin: 0;
				padding: 0;
				width: 100%;
				height: 100%;
				color: white;
				background-color: black;
				overflow: hidden;
			}

			.container {
				display: flex;
				width: 100%;
				height: 100%;
			}

			#streams {
				display: flex;
				flex-wrap: wrap;
				flex-grow: 1;
				align-items: center;
				align-content: center;
				justify-content: center;
				width: min-content;
				height: 100%;
			}

			#streams iframe {
				flex-grow: 1;
				aspect-ratio: __ASPECT_W__ / __ASPECT_H__;
			}

			#chat {
				width: __CHAT_WIDTH__px;
				height: 100%;
			}

			#chats {
				position: fixed;
				top: 0;
				right: 0;
				margin: 4px;
				padding: 4px;
				border-radius: 4px;
				background-color: rgba(0, 0, 0, 0.8);
				opacity: 0;
				transition: opacity 150ms ease-in-out;
			}

			#chats:hover {
				opacity: 1;
			}

			#chats a {
				color: #ddd;
				text-decoration: none;
			}

			#chats a:hover {
				color: #fff;
			}
		"#;

const SCRIPT_TEMPLATE: &str = r#"
			const streams = document.getElementById("streams");
			const chat = document.getElementById("chat");
			const frames = streams.querySelectorAll("iframe");
			const n = frames.length;
			function adjustLayout() {
				let isChatOpen = true;
				try {
					isChatOpen = window.frames.chat.location.href !== "__CLOSED_CHAT__";
				} catch {}
				chat.style.display = isChatOpen ? "block" : "none";

				const width = window.innerWidth - __MARGIN__ - (isChatOpen ? __CHAT_WIDTH__ : 0);
				const height = window.innerHeight - __MARGIN__;

				let bestWidth = 0;
				let bestHeight = 0;
				for (let cols = 1; cols <= n; cols++) {
					const rows = Math.ceil(n / cols);
					let maxWidth = Math.floor(width / cols);
					let maxHeight = Math.floor(height / rows);
					if ((maxWidth * __ASPECT_H__) / __ASPECT_W__ < maxHeight) {
						maxHeight = Math.floor((maxWidth * __ASPECT_H__) / __ASPECT_W__);
					} else {
						maxWidth = Math.floor((maxHeight * __ASPECT_W__) / __ASPECT_H__);
					}
					if (maxWidth > bestWidth) {
						bestWidth = maxWidth;
						bestHeight = maxHeight;
					}
				}
				frames.forEach((f) => {
					f.style.flexGrow = 0;
					f.style.width = `${bestWidth}px`;
					f.style.height = `${bestHeight}px`;
				});
			}

			adjustLayout();
			window.addEventListener("resize", adjustLayout);
			chat.addEventListener("load", adjustLayout);
		"#;

/// Inline style and script with their CSP hashes.
#[derive(Debug, Clone)]
pub struct InlineAssets {
    pub style: String,
    pub script: String,
    pub style_hash: ContentHash,
    pub script_hash: ContentHash,
}

impl InlineAssets {
    /// Generate the inline blocks for the given layout constants.
    pub fn new(params: &LayoutParams) -> Self {
        let fill = |template: &str| {
            template
                .replace("__MARGIN__", &params.margin_px.to_string())
                .replace("__CHAT_WIDTH__", &params.chat_width_px.to_string())
                .replace("__ASPECT_W__", &params.aspect_width.to_string())
                .replace("__ASPECT_H__", &params.aspect_height.to_string())
                .replace("__CLOSED_CHAT__", CLOSED_CHAT_URL)
        };

        let style = fill(STYLE_TEMPLATE);
        let script = fill(SCRIPT_TEMPLATE);

        Self {
            style_hash: ContentHash::sha256(&style),
            script_hash: ContentHash::sha256(&script),
            style,
            script,
        }
    }

    /// Assets for the default layout, generated once per instance.
    pub fn shared() -> &'static InlineAssets {
        static ASSETS: LazyLock<InlineAssets> =
            LazyLock::new(|| InlineAssets::new(&LayoutParams::default()));
        &ASSETS
    }
}

/// Hosts the player and chat frames are loaded from.
pub fn frame_allowlist() -> FrameAllowlist {
    FrameAllowlist::new()
        .allow_self()
        .allow_host("chzzk.naver.com")
        .allow_pattern("*.chzzk.naver.com")
        .allow_pattern("*.twitch.tv")
        .allow_pattern("*.afreecatv.com")
        .allow_host("www.youtube.com")
}

/// Policy for the embed page: inline blocks pinned by hash, frames limited
/// to the embed hosts.
pub fn content_security_policy(assets: &InlineAssets) -> ContentSecurityPolicy {
    ContentSecurityPolicy::new()
        .with(Directive::BaseUri, ["'self'"])
        .with(Directive::DefaultSrc, ["'self'"])
        .with(Directive::ScriptSrc, [assets.script_hash.csp_source()])
        .with(Directive::StyleSrc, [assets.style_hash.csp_source()])
        .with(Directive::FrameSrc, frame_allowlist().csp_sources())
        .with(Directive::ObjectSrc, ["'none'"])
}

/// HTML escape for text and attribute values.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_help(canonical_host: &str) -> String {
    format!(
        r#"<div>
					<h1>{title}</h1>
					<div>여러 방송을 함께 볼 수 있습니다.</div>
					<ul>
						<li>치지직 UID</li>
						<li>Twitch 아이디</li>
						<li>a:아프리카TV 아이디</li>
						<li>y:YouTube 영상 아이디</li>
					</ul>
					<div><b>예시:</b> https://{host}{example}</div>
				</div>"#,
        title = TITLE,
        host = escape_html(canonical_host),
        example = escape_html(EXAMPLE_PATH),
    )
}

fn render_players(streams: &[StreamRef]) -> String {
    streams
        .iter()
        .map(|s| {
            format!(
                r#"<iframe src="{}" frameborder="0" scrolling="no" allowfullscreen="true"></iframe>"#,
                escape_html(&s.player)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\t\t\t\t")
}

fn render_chat_links(chats: &[ChatEntry]) -> String {
    chats
        .iter()
        .map(|c| {
            format!(
                r#"<a href="{}" target="chat">{}</a>"#,
                escape_html(&c.target),
                escape_html(&c.label)
            )
        })
        .collect::<Vec<_>>()
        .join(" |\n\t\t\t")
}

/// Render the full document.
///
/// With no streams the grid area shows the help panel instead of players.
/// The chat frame starts on the first chat entry.
pub fn render(
    streams: &[StreamRef],
    chats: &[ChatEntry],
    canonical_host: &str,
    assets: &InlineAssets,
) -> String {
    let grid = if streams.is_empty() {
        render_help(canonical_host)
    } else {
        render_players(streams)
    };
    let first_chat = chats
        .first()
        .map(|c| c.target.as_str())
        .unwrap_or(CLOSED_CHAT_URL);

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
	<head>
		<meta charset="utf-8" />
		<meta name="viewport" content="width=device-width, initial-scale=1" />
		<title>{title}</title>
		<link rel="icon" href="/favicon.ico" sizes="32x32" />
		<link rel="icon" href="/icon.svg" type="image/svg+xml" />
		<link rel="apple-touch-icon" href="/apple-touch-icon.png" />
		<link rel="manifest" href="/manifest.webmanifest" />
		<style>{style}</style>
	</head>
	<body>
		<div class="container">
			<div id="streams">
				{grid}
			</div>
			<iframe src="{chat}" frameborder="0" scrolling="no" id="chat" name="chat"></iframe>
		</div>
		<div id="chats">
			{links}
		</div>
		<script>{script}</script>
	</body>
</html>
"#,
        title = TITLE,
        style = assets.style,
        grid = grid,
        chat = escape_html(first_chat),
        links = render_chat_links(chats),
        script = assets.script,
    )
}
