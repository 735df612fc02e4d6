use crate::models::DisplaySnapshot;

pub fn render_index(snapshot: &DisplaySnapshot) -> String {
    // Keep the embedded JSON from closing the <script> block early.
    let initial = serde_json::to_string(snapshot)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    INDEX_HTML.replace("{{INITIAL_STATE}}", &initial)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Lobby Statistics</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&display=swap');

    :root {
      --bg: #101820;
      --card: #1b2631;
      --ink: #e8eef2;
      --muted: #8aa0b0;
      --online: #3ecf8e;
      --offline: #e5534b;
      --pt: #2fa84f;
      --en: #3b7dd8;
      --tr: #d8423b;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px;
    }

    .stats-container {
      width: min(820px, 100%);
      display: grid;
      gap: 20px;
      transition: opacity 150ms ease;
    }

    .stats-container.loading {
      opacity: 0.55;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 14px;
    }

    .stat {
      background: var(--card);
      border-radius: 16px;
      padding: 18px;
      display: grid;
      gap: 6px;
    }

    .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
      display: flex;
      align-items: center;
      gap: 8px;
    }

    .value {
      font-size: 1.8rem;
      font-weight: 600;
    }

    .status-indicator {
      width: 9px;
      height: 9px;
      border-radius: 50%;
      background: var(--muted);
    }

    .status-online {
      background: var(--online);
    }

    .status-offline {
      background: var(--offline);
    }

    .bar {
      height: 10px;
      background: rgba(255, 255, 255, 0.08);
      border-radius: 999px;
      overflow: hidden;
    }

    .bar span {
      display: block;
      height: 100%;
      width: 0;
      transition: width 300ms ease;
    }

    #ptProgress { background: var(--pt); }
    #enProgress { background: var(--en); }
    #trProgress { background: var(--tr); }

    .actions {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
    }

    button {
      appearance: none;
      border: 1px solid rgba(255, 255, 255, 0.15);
      background: transparent;
      color: var(--ink);
      border-radius: 999px;
      padding: 10px 16px;
      font: inherit;
      cursor: pointer;
    }

    button.active {
      background: var(--ink);
      color: var(--bg);
    }

    .success-message { color: var(--online); }
    .error-message { color: var(--offline); }

    .footer {
      color: var(--muted);
      font-size: 0.85rem;
    }
  </style>
</head>
<body>
  <main class="stats-container">
    <section class="panel">
      <div class="stat">
        <span class="label"><i id="totalStatus" class="status-indicator"></i>Total visits</span>
        <span id="totalVisits" class="value">-</span>
      </div>
      <div class="stat">
        <span class="label"><i id="todayStatus" class="status-indicator"></i>Visits today</span>
        <span id="todayVisits" class="value">-</span>
      </div>
      <div class="stat">
        <span class="label"><i id="discordStatus" class="status-indicator"></i>Discord clicks</span>
        <span id="discordClicks" class="value">-</span>
      </div>
    </section>

    <section class="stat">
      <span class="label">Languages</span>
      <div>PT <b id="ptCount">-</b></div>
      <div class="bar"><span id="ptProgress"></span></div>
      <div>EN <b id="enCount">-</b></div>
      <div class="bar"><span id="enProgress"></span></div>
      <div>TR <b id="trCount">-</b></div>
      <div class="bar"><span id="trProgress"></span></div>
    </section>

    <section class="actions">
      <button type="button" id="reload">Reload</button>
      <button type="button" class="api-option" data-api="remote">Remote</button>
      <button type="button" class="api-option" data-api="memory">Demo</button>
      <a id="discordLink" href="https://discord.com" target="_blank" rel="noopener"><button type="button">Discord</button></a>
      <span>
        <button type="button" class="lang-option" data-lang="pt">PT</button>
        <button type="button" class="lang-option" data-lang="en">EN</button>
        <button type="button" class="lang-option" data-lang="tr">TR</button>
        <button type="button" class="lang-option" data-lang="es">ES</button>
      </span>
    </section>

    <div id="statusMessage"></div>
    <p class="footer">Source: <span id="currentAPI">-</span> &middot; Last update: <span id="lastUpdate">-</span></p>
  </main>

  <script>
    const REFRESH_MS = 5000;
    const container = document.querySelector('.stats-container');

    const render = (state) => {
      Object.entries(state.counters || {}).forEach(([id, text]) => {
        const el = document.getElementById(id);
        if (el) el.textContent = text;
      });
      Object.entries(state.statuses || {}).forEach(([id, online]) => {
        const el = document.getElementById(id);
        if (el) el.className = `status-indicator ${online ? 'status-online' : 'status-offline'}`;
      });
      const progress = state.progress || { pt: 0, en: 0, tr: 0 };
      document.getElementById('ptProgress').style.width = progress.pt + '%';
      document.getElementById('enProgress').style.width = progress.en + '%';
      document.getElementById('trProgress').style.width = progress.tr + '%';

      const statusDiv = document.getElementById('statusMessage');
      statusDiv.textContent = '';
      if (state.message) {
        const div = document.createElement('div');
        div.className = state.message.is_error ? 'error-message' : 'success-message';
        div.textContent = state.message.text;
        statusDiv.appendChild(div);
      }

      document.getElementById('lastUpdate').textContent = state.last_update || '-';
      document.getElementById('currentAPI').textContent = state.backend_label || '-';
      document.querySelectorAll('.api-option').forEach((btn) => {
        btn.classList.toggle('active', btn.dataset.api === state.active_backend);
      });
      container.classList.toggle('loading', Boolean(state.loading));
    };

    const call = async (method, path, body) => {
      const res = await fetch(path, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) throw new Error(await res.text());
      return res.status === 204 ? null : res.json();
    };

    const poll = () => call('GET', '/api/stats').then(render).catch(console.error);

    document.getElementById('reload').addEventListener('click', () => {
      container.classList.add('loading');
      call('POST', '/api/stats/reload').then(render).catch(console.error);
    });

    document.querySelectorAll('.api-option').forEach((btn) => {
      btn.addEventListener('click', () => {
        container.classList.add('loading');
        call('POST', '/api/backend', { backend: btn.dataset.api }).then(render).catch(console.error);
      });
    });

    document.querySelectorAll('.lang-option').forEach((btn) => {
      btn.addEventListener('click', () => {
        call('POST', '/api/track/language', { lang: btn.dataset.lang }).catch(console.error);
      });
    });

    document.getElementById('discordLink').addEventListener('click', () => {
      call('POST', '/api/track/discord').catch(console.error);
    });

    render({{INITIAL_STATE}});
    setInterval(poll, REFRESH_MS);
  </script>
</body>
</html>
"#;
