//! HTML pages served by the gateway

use crate::upstream::{RelayResult, RelayStatus};

const STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";

/// Add-magnet form
pub fn home_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Add Magnet - qBittorrent Gateway</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="{STYLESHEET}">
    <style>
        article {{ margin-top: 2rem; }}
    </style>
</head>
<body>
    <main class="container">
        <article>
            <header>
                <h2>Add Magnet Link</h2>
                <p>Enter a magnet link or infohash</p>
            </header>
            <form id="addForm">
                <input type="text" name="magnet" placeholder="magnet:?xt=urn:btih:... or infohash" required autofocus>
                <button type="submit">Add Torrent</button>
            </form>
            <p><a href="/logout">Sign out</a></p>
        </article>
    </main>
    <script>
        document.getElementById('addForm').addEventListener('submit', (e) => {{
            e.preventDefault();
            const input = new FormData(e.target).get('magnet').trim();
            if (!input) return;
            window.location.href = input.startsWith('magnet:')
                ? '/' + input
                : '/' + encodeURIComponent(input);
        }});
    </script>
</body>
</html>"#
    )
}

/// Sign-in form posting JSON to `/api/login`
pub fn auth_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Sign In - qBittorrent Gateway</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="{STYLESHEET}">
    <style>
        article {{ margin-top: 2rem; }}
    </style>
</head>
<body>
    <main class="container">
        <article>
            <header>
                <h2>Sign In</h2>
                <p>Enter your qBittorrent credentials</p>
            </header>
            <form id="loginForm">
                <input type="text" name="username" placeholder="Username" autocomplete="username" required>
                <input type="password" name="password" placeholder="Password" autocomplete="current-password" required>
                <button type="submit">Sign In</button>
            </form>
            <div id="status"></div>
        </article>
    </main>
    <script>
        document.getElementById('loginForm').addEventListener('submit', async (e) => {{
            e.preventDefault();
            const status = document.getElementById('status');
            const form = new FormData(e.target);
            const button = e.target.querySelector('button[type="submit"]');

            button.ariaBusy = true;
            button.disabled = true;
            status.textContent = '';

            const show = (text, color) => {{
                const p = document.createElement('p');
                p.style.color = color;
                p.textContent = text;
                status.replaceChildren(p);
            }};

            try {{
                const response = await fetch('/api/login', {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{
                        username: form.get('username'),
                        password: form.get('password')
                    }})
                }});

                if (response.ok) {{
                    show('✓ Authentication successful! Redirecting...', 'var(--pico-ins-color)');
                    setTimeout(() => window.location.href = '/', 1000);
                }} else {{
                    show('✗ ' + await response.text(), 'var(--pico-del-color)');
                }}
            }} catch (error) {{
                show('✗ Error: ' + error.message, 'var(--pico-del-color)');
            }} finally {{
                button.ariaBusy = false;
                button.disabled = false;
            }}
        }});
    </script>
</body>
</html>"#
    )
}

/// Outcome of an add-torrent request
pub fn result_page(result: &RelayResult) -> String {
    let (title, badge_color) = match result.status {
        RelayStatus::Success => ("Success", "#43a047"),
        RelayStatus::PartialSuccess => ("Warning", "#fb8c00"),
    };
    let badge = result.status.as_str().to_uppercase().replace('_', " ");

    let infohash_html = if result.infohash != "unknown" {
        format!(
            "<p><strong>Infohash:</strong> <code>{}</code></p>",
            escape_html(&result.infohash)
        )
    } else {
        String::new()
    };

    let api_error_html = match &result.api_error {
        Some(error) => format!(
            "<p><mark><strong>API Warning:</strong> {}</mark></p>",
            escape_html(error)
        ),
        None => String::new(),
    };

    let files_html = if result.files.is_empty() {
        String::new()
    } else {
        let items: String = result
            .files
            .iter()
            .map(|file| {
                format!(
                    "\n                <li>{} <code>{}</code></li>",
                    escape_html(&file.name),
                    format_bytes(file.size)
                )
            })
            .collect();
        format!("<ol class=\"file-list\">{}\n            </ol>", items)
    };

    let mut summary = format!(
        "status: {}\ninfohash: {}",
        result.status.as_str(),
        result.infohash
    );
    if let Some(error) = &result.api_error {
        summary.push_str(&format!("\napi_error: {}", error));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title} - qBittorrent Gateway</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="{STYLESHEET}">
    <style>
        article {{ margin-top: 2rem; }}
        .status-badge {{
            display: inline-block;
            padding: 0.25rem 0.75rem;
            border-radius: 1rem;
            background: {badge_color};
            color: white;
            font-weight: 600;
            margin-bottom: 1rem;
        }}
        .file-list {{
            max-height: 400px;
            overflow-y: auto;
            padding: 1rem;
            margin: 0;
        }}
        .file-list li {{
            padding: 0.5rem;
            border-bottom: 1px solid var(--pico-muted-border-color);
        }}
        .file-list li:last-child {{ border-bottom: none; }}
        code {{ font-weight: normal !important; }}
    </style>
</head>
<body>
    <main class="container">
        <article>
            <header>
                <span class="status-badge">{badge}</span>
                <h2>{message}</h2>
            </header>
            {infohash_html}
            {api_error_html}
            {files_html}
            <details>
                <summary>Details</summary>
                <pre class="summary">{summary}</pre>
            </details>
            <p><a href="/">Add another</a></p>
        </article>
    </main>
</body>
</html>"#,
        message = escape_html(result.message),
        summary = escape_html(&summary),
    )
}

/// Human-readable size using 1024-based units, e.g. `1.5 KB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut threshold: u64 = 1024;
    while exponent < UNITS.len() - 1 && bytes >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[exponent])
}

/// Escape text for interpolation into HTML
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
