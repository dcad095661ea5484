//! Browser chat page served at `/`.
//!
//! The page keeps its history in `localStorage` under `aiChatHistory` using
//! the same record shape as the terminal client's history file, and talks to
//! `POST /generate`.

use axum::{extract::State, response::Html};

use super::AppState;

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{{title}}</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: system-ui, -apple-system, sans-serif; background: #0f0f0f; color: #e0e0e0;
           display: flex; flex-direction: column; height: 100vh; }
    header { display: flex; gap: 0.75rem; align-items: center; padding: 0.75rem 1rem; border-bottom: 1px solid #333; }
    header h1 { font-size: 1.1rem; flex: 1; }
    select, button, textarea { font: inherit; color: inherit; background: #1a1a1a; border: 1px solid #333; border-radius: 8px; }
    select, button { padding: 0.4rem 0.8rem; }
    button { cursor: pointer; background: #2a2a3a; }
    button:disabled { opacity: 0.5; cursor: default; }
    #chat-messages { flex: 1; overflow-y: auto; padding: 1rem; display: flex; flex-direction: column; gap: 0.75rem; }
    .message { display: flex; gap: 0.6rem; align-items: flex-start; }
    .message.user { flex-direction: row-reverse; }
    .message-content { max-width: 70%; padding: 0.6rem 0.9rem; border-radius: 12px; background: #1a1a1a;
                       white-space: pre-wrap; word-break: break-word; }
    .message.user .message-content { background: #2a2a3a; }
    .message-time { font-size: 0.7rem; color: #777; align-self: flex-end; }
    #typing-indicator { display: none; padding: 0 1rem 0.5rem; color: #888; font-size: 0.85rem; }
    #typing-indicator.show { display: block; }
    footer { display: flex; gap: 0.5rem; padding: 0.75rem 1rem; border-top: 1px solid #333; }
    textarea { flex: 1; resize: none; padding: 0.5rem 0.7rem; height: 2.5rem; max-height: 120px; }
  </style>
</head>
<body>
  <header>
    <h1>{{title}}</h1>
    <select id="model">{{options}}</select>
    <button id="clear-chat-btn" type="button">Clear chat</button>
  </header>
  <div id="chat-messages"></div>
  <div id="typing-indicator">🤖 thinking…</div>
  <footer>
    <textarea id="message-input" placeholder="Type a message (Shift+Enter for a new line)"></textarea>
    <button id="send-button" type="button">Send</button>
  </footer>
"#;

const PAGE_SCRIPT: &str = r#"  <script>
    const KEY = 'aiChatHistory';
    const history = JSON.parse(localStorage.getItem(KEY) || '[]');
    const list = document.getElementById('chat-messages');
    const input = document.getElementById('message-input');
    const send = document.getElementById('send-button');
    const typing = document.getElementById('typing-indicator');

    const save = () => localStorage.setItem(KEY, JSON.stringify(history));
    const scroll = () => { list.scrollTop = list.scrollHeight; };

    function split(content) {
      let summary = '', response = '', parsed = false;
      try {
        const v = JSON.parse(content);
        parsed = true;
        if (v && typeof v === 'object') { summary = v.summary || ''; response = v.response || ''; }
      } catch (e) {}
      if (!parsed) {
        const s = content.match(/Summary:\s*(.*?)(?:\n|$)/i);
        const r = content.match(/Response:\s*([\s\S]*)/i);
        if (s) summary = s[1].trim();
        if (r) response = r[1].trim();
      }
      if (!summary && !response) response = content;
      if (typeof response !== 'string') response = JSON.stringify(response);
      response = response.replace(/^"|"$/g, '');
      if ((response.startsWith('{') && response.endsWith('}')) || (response.startsWith('[') && response.endsWith(']'))) {
        try { const o = JSON.parse(response); response = typeof o === 'string' ? o : JSON.stringify(o, null, 2); } catch (e) {}
      }
      return { summary, response };
    }

    function add(content, type, timestamp) {
      const row = document.createElement('div');
      row.className = 'message ' + type;
      const avatar = document.createElement('div');
      avatar.textContent = type === 'user' ? '👤' : '🤖';
      const body = document.createElement('div');
      body.className = 'message-content';
      if (type === 'ai') {
        const p = split(content);
        body.textContent = '📝 Summary: ' + p.summary + '\n\n💬 AI Response:\n' + p.response;
      } else {
        body.textContent = content;
      }
      const time = document.createElement('div');
      time.className = 'message-time';
      time.textContent = new Date(timestamp).toLocaleTimeString();
      row.append(avatar, body, time);
      list.appendChild(row);
    }

    function busy(on) { send.disabled = on; typing.classList.toggle('show', on); }

    async function sendMessage() {
      const message = input.value.trim();
      const model = document.getElementById('model').value;
      if (!message) return;
      const ts = new Date().toISOString();
      add(message, 'user', ts);
      history.push({ content: message, type: 'user', timestamp: ts, model });
      save();
      input.value = '';
      busy(true);
      scroll();
      try {
        const res = await fetch('/generate', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ message, model }),
        });
        const data = await res.json();
        if (data.error) {
          add('Error: ' + data.error, 'ai', new Date().toISOString());
        } else {
          const content = 'Summary: ' + data.summary + '\nResponse: ' + data.response;
          const at = new Date().toISOString();
          add(content, 'ai', at);
          history.push({ content, type: 'ai', timestamp: at, model });
          save();
        }
      } catch (err) {
        add('Error: ' + err.message, 'ai', new Date().toISOString());
      } finally {
        busy(false);
        scroll();
      }
    }

    document.getElementById('clear-chat-btn').addEventListener('click', () => {
      if (!confirm('Are you sure you want to clear all chat history? This action cannot be undone.')) return;
      history.length = 0;
      localStorage.removeItem(KEY);
      list.innerHTML = '';
      add('✅ Chat history has been cleared successfully.', 'ai', new Date().toISOString());
      input.focus();
    });
    input.addEventListener('keydown', (e) => {
      if (e.key === 'Enter' && !e.shiftKey) { e.preventDefault(); sendMessage(); }
    });
    send.addEventListener('click', sendMessage);

    history.forEach((m) => add(m.content, m.type, m.timestamp));
    scroll();
    input.focus();
  </script>
</body>
</html>
"#;

/// GET / — chat page with the loaded models in the picker.
pub(super) async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.app_name, &state.catalog.available(), state.catalog.default_model()))
}

fn render_page(title: &str, models: &[String], default_model: &str) -> String {
    let options: String = models
        .iter()
        .map(|m| {
            let selected = if m == default_model { " selected" } else { "" };
            let m = escape_html(m);
            format!(r#"<option value="{m}"{selected}>{m}</option>"#)
        })
        .collect();

    let mut page = PAGE_HEAD
        .replace("{{title}}", &escape_html(title))
        .replace("{{options}}", &options);
    page.push_str(PAGE_SCRIPT);
    page
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_selected() {
        let page = render_page("summchat", &["gemma2-2b".into(), "llama3.2-3b".into()], "llama3.2-3b");
        assert!(page.contains(r#"<option value="gemma2-2b">gemma2-2b</option>"#));
        assert!(page.contains(r#"<option value="llama3.2-3b" selected>llama3.2-3b</option>"#));
        assert!(page.contains("<title>summchat</title>"));
    }

    #[test]
    fn names_are_escaped() {
        let page = render_page("<chat>", &["a\"b".into()], "x");
        assert!(page.contains("<title>&lt;chat&gt;</title>"));
        assert!(page.contains(r#"value="a&quot;b""#));
    }

    #[test]
    fn escape_html_covers_specials() {
        assert_eq!(escape_html(r#"<a href='x'>&"#), "&lt;a href=&#39;x&#39;&gt;&amp;");
    }
}
