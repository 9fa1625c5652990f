//! Embedded HTML/CSS/JS frontend for the callsight dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.
//!
//! All non-presentational behavior lives server-side: the page fetches the
//! view model, metrics (with pre-templated topic prompts), the sentiment
//! curve, and the chat log from the JSON API, and relays sends through
//! `POST /api/chat`. The only state kept here is pure presentation: which
//! explanation banner is open and whether the graph is expanded.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>callsight Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.layout { display: flex; height: 100vh; overflow: hidden; }
.main { flex: 1; overflow-y: auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; font-weight: 600; }
header h1 span { color: var(--cyan); }
header .sub { color: var(--text-muted); font-size: 12px; }
.pill {
  font-family: var(--mono);
  font-size: 11px;
  padding: 3px 10px;
  border-radius: 999px;
  border: 1px solid var(--border);
  color: var(--text-muted);
}
.pill.online { color: var(--green); border-color: var(--green); }
.pill.offline { color: var(--red); border-color: var(--red); }

/* KPI cards */
.cards { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; margin-bottom: 16px; }
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  cursor: pointer;
  transition: border-color .15s;
}
.card:hover, .card.active { border-color: var(--accent); }
.card .title { font-size: 11px; text-transform: uppercase; letter-spacing: .08em; color: var(--text-muted); }
.card .value { font-size: 28px; font-weight: 700; margin-top: 4px; }
.card .trend {
  display: inline-block;
  font-size: 11px;
  font-weight: 600;
  margin-left: 8px;
  padding: 1px 8px;
  border-radius: 999px;
  background: rgba(88,166,255,.15);
  color: var(--accent);
}
.card .trend.up { background: rgba(63,185,80,.15); color: var(--green); }
.card .trend.critical { background: rgba(188,140,255,.15); color: var(--purple); }

/* Explanation banner */
.banner {
  display: none;
  background: var(--surface);
  border: 1px solid var(--border);
  border-left: 3px solid var(--accent);
  border-radius: var(--radius);
  padding: 14px 16px;
  margin-bottom: 16px;
}
.banner.open { display: block; }
.banner .head { display: flex; justify-content: space-between; align-items: baseline; }
.banner h4 { font-size: 12px; text-transform: uppercase; letter-spacing: .06em; color: var(--accent); }
.banner .close { background: none; border: none; color: var(--text-muted); cursor: pointer; font-size: 14px; }
.banner .close:hover { color: var(--text); }
.banner p { color: var(--text); margin-top: 6px; font-size: 13px; }
.topics { margin-top: 10px; display: flex; gap: 8px; flex-wrap: wrap; }
.topic {
  background: rgba(57,210,192,.08);
  border: 1px solid var(--cyan);
  color: var(--cyan);
  font-size: 12px;
  padding: 5px 12px;
  border-radius: 6px;
  cursor: pointer;
}
.topic:hover { background: var(--cyan); color: var(--bg); }

/* Sentiment graph */
.graph {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 14px 16px;
  margin-bottom: 16px;
  cursor: pointer;
}
.graph .head { display: flex; justify-content: space-between; align-items: center; margin-bottom: 8px; }
.graph h3 { font-size: 12px; letter-spacing: .08em; color: var(--text-muted); text-transform: uppercase; }
.graph svg { width: 100%; height: 60px; overflow: visible; }
.graph .detail { display: none; margin-top: 10px; padding-top: 10px; border-top: 1px solid var(--border); }
.graph.expanded .detail { display: flex; gap: 32px; align-items: center; }
.graph .stat .label { font-size: 10px; text-transform: uppercase; color: var(--text-muted); }
.graph .stat .num { font-size: 18px; font-weight: 700; }
.graph .stat .num.low { color: var(--red); }
.graph .stat .num.high { color: var(--green); }
.btn {
  background: var(--accent);
  border: none;
  color: var(--bg);
  font-weight: 600;
  font-size: 12px;
  padding: 6px 14px;
  border-radius: 6px;
  cursor: pointer;
}
.btn:disabled { opacity: .5; cursor: not-allowed; }

/* Transcript heatmap */
.transcript {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
}
.transcript .head { display: flex; justify-content: space-between; margin-bottom: 12px; }
.transcript h2 { font-size: 15px; }
.transcript .id { font-family: var(--mono); font-size: 11px; color: var(--text-muted); }
.turn {
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 10px 12px;
  margin-bottom: 8px;
}
.turn.causal { border-color: var(--red); background: rgba(248,81,73,.08); }
.turn .speaker { font-size: 10px; font-weight: 700; text-transform: uppercase; color: var(--accent); }
.turn .text { font-size: 13px; margin-top: 2px; }
.empty { color: var(--text-muted); text-align: center; padding: 32px 0; }

/* Chat sidebar */
.chat {
  width: 360px;
  border-left: 1px solid var(--border);
  background: var(--surface);
  display: flex;
  flex-direction: column;
}
.chat .head { padding: 16px; border-bottom: 1px solid var(--border); }
.chat .head h3 { font-size: 15px; }
.chat .head .sub { font-size: 11px; color: var(--text-muted); }
.chat .head .sub span { font-family: var(--mono); color: var(--cyan); }
.log { flex: 1; overflow-y: auto; padding: 14px; }
.msg { max-width: 85%; padding: 8px 12px; border-radius: 10px; margin-bottom: 10px; font-size: 13px; }
.msg.user { margin-left: auto; background: var(--accent); color: var(--bg); border-bottom-right-radius: 2px; }
.msg.system { background: var(--bg); border: 1px solid var(--border); border-bottom-left-radius: 2px; }
.typing { color: var(--text-muted); font-size: 12px; padding: 4px 12px; display: none; }
.typing.on { display: block; }
.compose { display: flex; gap: 8px; padding: 12px; border-top: 1px solid var(--border); }
.compose input {
  flex: 1;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 8px 12px;
  font-size: 13px;
}
.compose input:focus { outline: none; border-color: var(--accent); }
</style>
</head>
<body>
<div class="layout">
  <div class="main">
    <header>
      <div>
        <h1>call<span>sight</span></h1>
        <div class="sub">Causal traceability dashboard</div>
      </div>
      <span class="pill" id="status-pill">checking...</span>
    </header>

    <div class="cards" id="cards"></div>

    <div class="banner" id="banner">
      <div class="head">
        <h4 id="banner-title"></h4>
        <button class="close" onclick="dismissMetric()">&times;</button>
      </div>
      <p id="banner-text"></p>
      <div class="topics" id="banner-topics"></div>
    </div>

    <div class="graph" id="graph" onclick="toggleGraph()">
      <div class="head">
        <h3>Sentiment velocity</h3>
        <span class="pill online">positive resolution detected</span>
      </div>
      <svg id="graph-svg" preserveAspectRatio="none" viewBox="0 0 100 50"></svg>
      <div class="detail">
        <div class="stat"><div class="label">Lowest point</div><div class="num low" id="graph-low"></div></div>
        <div class="stat"><div class="label">Peak point</div><div class="num high" id="graph-high"></div></div>
        <button class="btn" onclick="askAboutGraph(event)">Ask why</button>
      </div>
    </div>

    <div class="transcript">
      <div class="head">
        <h2>Transcript analysis</h2>
        <span class="id" id="transcript-id"></span>
      </div>
      <div id="turns"></div>
    </div>
  </div>

  <div class="chat">
    <div class="head">
      <h3>Interactive reasoning</h3>
      <div class="sub">Ask questions about transcript <span id="chat-id"></span></div>
    </div>
    <div class="log" id="log"></div>
    <div class="typing" id="typing">analyst is typing&hellip;</div>
    <div class="compose">
      <input type="text" id="input" placeholder="Ask about specific topics..."
             onkeydown="if (event.key === 'Enter') sendMessage()">
      <button class="btn" id="send" onclick="sendMessage()">Send</button>
    </div>
  </div>
</div>

<script>
let metricsData = null;
let activeMetric = null;

async function getJSON(url) {
  const resp = await fetch(url);
  if (!resp.ok) throw new Error('HTTP ' + resp.status);
  return resp.json();
}

// --- KPI cards + explanation banner ---

function renderCards() {
  const el = document.getElementById('cards');
  el.innerHTML = '';
  for (const card of metricsData.cards) {
    const div = document.createElement('div');
    div.className = 'card' + (card.key === activeMetric ? ' active' : '');
    const trendClass = card.trend.startsWith('+') ? 'up' : (card.trend === 'Critical' ? 'critical' : '');
    div.innerHTML = '<div class="title">' + card.title + '</div>' +
      '<div class="value">' + card.value +
      (card.trend ? '<span class="trend ' + trendClass + '">' + card.trend + '</span>' : '') +
      '</div>';
    div.onclick = () => selectMetric(card.key);
    el.appendChild(div);
  }
}

function selectMetric(key) {
  activeMetric = key;
  const card = metricsData.cards.find(c => c.key === key);
  document.getElementById('banner-title').textContent = card.panel_title;
  document.getElementById('banner-text').textContent = card.explanation;

  const topics = document.getElementById('banner-topics');
  topics.innerHTML = '';
  if (key === 'reason') {
    for (const t of metricsData.topics) {
      const btn = document.createElement('button');
      btn.className = 'topic';
      btn.textContent = t.topic;
      btn.onclick = () => focusChatWith(t.prompt);
      topics.appendChild(btn);
    }
  }

  document.getElementById('banner').classList.add('open');
  renderCards();
}

function dismissMetric() {
  activeMetric = null;
  document.getElementById('banner').classList.remove('open');
  renderCards();
}

// Stage a prompt in the chat input and focus it. Never auto-sends.
function focusChatWith(prompt) {
  const input = document.getElementById('input');
  input.value = prompt;
  input.focus();
}

// --- Sentiment graph (mock data from the API) ---

async function renderGraph() {
  const data = await getJSON('/api/sentiment');
  const points = data.points;
  const path = points.map((p, i) => {
    const x = (i / (points.length - 1)) * 100;
    const y = 50 - ((p / 100) * 50);
    return (i === 0 ? 'M ' : 'L ') + x + ' ' + y;
  }).join(' ');
  document.getElementById('graph-svg').innerHTML =
    '<path d="' + path + '" fill="none" stroke="#bc8cff" stroke-width="2" vector-effect="non-scaling-stroke"/>';
  document.getElementById('graph-low').textContent = Math.min(...points) + '%';
  document.getElementById('graph-high').textContent = Math.max(...points) + '%';
}

function toggleGraph() {
  document.getElementById('graph').classList.toggle('expanded');
}

function askAboutGraph(event) {
  event.stopPropagation();
  focusChatWith('Why did the sentiment drop at the beginning and rise at the end?');
}

// --- Transcript heatmap ---

async function renderTranscript() {
  const data = await getJSON('/api/call');
  const turnsEl = document.getElementById('turns');
  if (!data.loaded || data.call.transcript.length === 0) {
    turnsEl.innerHTML = '<div class="empty">No transcript data loaded.</div>';
    return;
  }
  document.getElementById('transcript-id').textContent = 'ID: ' + data.call.transcript_id;
  turnsEl.innerHTML = '';
  data.call.transcript.forEach((turn, index) => {
    const div = document.createElement('div');
    div.className = 'turn' + (index === data.highlighted_turn ? ' causal' : '');
    div.innerHTML = '<div class="speaker"></div><div class="text"></div>';
    div.querySelector('.speaker').textContent = turn.speaker;
    div.querySelector('.text').textContent = turn.text;
    turnsEl.appendChild(div);
  });
}

// --- Chat ---

function appendBubble(role, content) {
  const log = document.getElementById('log');
  const div = document.createElement('div');
  div.className = 'msg ' + role;
  div.textContent = content;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

async function renderChatLog() {
  const data = await getJSON('/api/chat/log');
  document.getElementById('chat-id').textContent = data.transcript_id;
  document.getElementById('log').innerHTML = '';
  for (const msg of data.messages) appendBubble(msg.role, msg.content);
}

async function sendMessage() {
  const input = document.getElementById('input');
  const text = input.value;
  if (!text.trim()) return;

  appendBubble('user', text.trim());
  input.value = '';
  document.getElementById('typing').classList.add('on');
  document.getElementById('send').disabled = true;

  try {
    const resp = await fetch('/api/chat', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ message: text }),
    });
    const data = await resp.json();
    appendBubble('system', data.response || data.error);
  } catch (err) {
    appendBubble('system', 'System offline. Could not reach the analysis backend — is it running?');
  } finally {
    document.getElementById('typing').classList.remove('on');
    document.getElementById('send').disabled = false;
  }
}

// --- Health pill ---

async function renderHealth() {
  const pill = document.getElementById('status-pill');
  try {
    const data = await getJSON('/api/health');
    if (data.backend_reachable) {
      pill.textContent = 'system online';
      pill.className = 'pill online';
    } else {
      pill.textContent = 'backend offline';
      pill.className = 'pill offline';
    }
  } catch (err) {
    pill.textContent = 'backend offline';
    pill.className = 'pill offline';
  }
}

// --- Init ---

async function init() {
  metricsData = await getJSON('/api/metrics');
  renderCards();
  await Promise.all([renderGraph(), renderTranscript(), renderChatLog()]);
  renderHealth();
}

init().catch(err => console.error('dashboard init failed:', err));
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_contains_expected_sections() {
        assert!(INDEX_HTML.contains("callsight Dashboard"));
        assert!(INDEX_HTML.contains("/api/metrics"));
        assert!(INDEX_HTML.contains("/api/chat"));
        assert!(INDEX_HTML.contains("/api/sentiment"));
        assert!(INDEX_HTML.contains("/api/call"));
    }
}
