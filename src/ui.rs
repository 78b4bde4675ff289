use crate::models::MoodCategory;

/// Accent color token the page uses for a mood.
pub fn theme_color(mood: MoodCategory) -> &'static str {
    match mood {
        MoodCategory::Happy => "yellow",
        MoodCategory::Sad => "blue",
        MoodCategory::Angry => "red",
        MoodCategory::Excited => "orange",
        MoodCategory::Calm => "green",
        MoodCategory::Anxious => "purple",
    }
}

pub fn render_index() -> String {
    INDEX_HTML.to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mood Journal</title>
  <style>
    :root {
      --bg-1: #f5f3ff;
      --bg-2: #e0e7ff;
      --ink: #2d2a3e;
      --accent: #7c3aed;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(76, 29, 149, 0.15);
      --yellow: #eab308;
      --blue: #3b82f6;
      --red: #ef4444;
      --orange: #f97316;
      --green: #22c55e;
      --purple: #a855f7;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      margin: 0;
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    .subtitle {
      margin: 0;
      color: #6b6880;
    }

    .moods {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
    }

    .mood {
      border: 2px solid #e5e7eb;
      background: #f9fafb;
      border-radius: 16px;
      padding: 16px;
      font-size: 1rem;
      cursor: pointer;
    }

    .mood.selected {
      color: white;
      border-color: transparent;
    }

    textarea {
      width: 100%;
      border-radius: 12px;
      border: 1px solid #d1d5db;
      padding: 12px;
      font: inherit;
      resize: vertical;
    }

    button.primary {
      border: none;
      border-radius: 999px;
      padding: 14px 22px;
      font-size: 1rem;
      font-weight: 600;
      color: white;
      background: var(--accent);
      cursor: pointer;
    }

    button:disabled {
      background: #9ca3af;
      cursor: not-allowed;
    }

    .result {
      border-radius: 20px;
      border: 2px solid var(--result-color, #e5e7eb);
      padding: 20px;
      display: none;
    }

    .notices {
      color: #b45309;
      font-size: 0.9rem;
    }

    .chat-log {
      display: grid;
      gap: 8px;
      max-height: 280px;
      overflow-y: auto;
    }

    .turn {
      padding: 8px 12px;
      border-radius: 14px;
      max-width: 80%;
    }

    .turn.user {
      justify-self: end;
      background: var(--accent);
      color: white;
    }

    .turn.assistant {
      justify-self: start;
      background: #f3f4f6;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Mood Journal</h1>
      <p class="subtitle">Pick a mood or describe how you feel to get a message and a few ideas.</p>
    </header>

    <section>
      <div class="moods" id="moods"></div>
    </section>

    <section>
      <textarea id="text" rows="3" placeholder="Or describe how you feel..."></textarea>
    </section>

    <section>
      <label><input type="checkbox" id="save" /> Save to my history</label>
      <button class="primary" id="analyze" type="button" disabled>Analyze My Mood</button>
    </section>

    <section class="result" id="result">
      <h2 id="result-title"></h2>
      <p id="result-message"></p>
      <ul id="result-tips"></ul>
      <div class="notices" id="notices"></div>
      <button class="primary" id="open-chat" type="button">Talk it through</button>
    </section>

    <section id="chat" hidden>
      <div class="chat-log" id="chat-log"></div>
      <textarea id="chat-text" rows="2" placeholder="Share what's on your mind..."></textarea>
      <button class="primary" id="chat-send" type="button" disabled>Send</button>
      <button id="chat-end" type="button">End chat</button>
    </section>
  </main>

  <script>
    const moodsEl = document.getElementById('moods');
    const textEl = document.getElementById('text');
    const saveEl = document.getElementById('save');
    const analyzeBtn = document.getElementById('analyze');
    const resultEl = document.getElementById('result');
    const chatEl = document.getElementById('chat');
    const chatLog = document.getElementById('chat-log');
    const chatText = document.getElementById('chat-text');
    const chatSend = document.getElementById('chat-send');

    let selectedMood = null;
    let lastMood = null;
    let chatId = null;
    let inFlight = false;
    let chatInFlight = false;

    const headers = () => {
      const h = { 'Content-Type': 'application/json' };
      const user = localStorage.getItem('userId');
      const key = localStorage.getItem('moodApiKey');
      if (user) h['X-User-Id'] = user;
      if (key) h['X-Mood-Api-Key'] = key;
      return h;
    };

    const refreshAnalyze = () => {
      const hasInput = selectedMood !== null || textEl.value.trim() !== '';
      analyzeBtn.disabled = inFlight || !hasInput;
    };

    const refreshChat = () => {
      chatSend.disabled = chatInFlight || chatText.value.trim() === '';
    };

    const renderMoods = (moods) => {
      moodsEl.innerHTML = '';
      moods.forEach((mood) => {
        const btn = document.createElement('button');
        btn.className = 'mood';
        btn.type = 'button';
        btn.textContent = `${mood.emoji} ${mood.label}`;
        btn.addEventListener('click', () => {
          selectedMood = selectedMood === mood.value ? null : mood.value;
          textEl.value = '';
          Array.from(moodsEl.children).forEach((child) => {
            child.classList.remove('selected');
            child.style.background = '';
          });
          if (selectedMood) {
            btn.classList.add('selected');
            btn.style.background = `var(--${mood.color})`;
          }
          refreshAnalyze();
        });
        moodsEl.appendChild(btn);
      });
    };

    const renderTurns = (turns) => {
      chatLog.innerHTML = '';
      turns.forEach((turn) => {
        const div = document.createElement('div');
        div.className = `turn ${turn.role}`;
        div.textContent = turn.text;
        chatLog.appendChild(div);
      });
      chatLog.scrollTop = chatLog.scrollHeight;
    };

    textEl.addEventListener('input', () => {
      if (textEl.value.trim() !== '') {
        selectedMood = null;
        Array.from(moodsEl.children).forEach((child) => {
          child.classList.remove('selected');
          child.style.background = '';
        });
      }
      refreshAnalyze();
    });

    analyzeBtn.addEventListener('click', async () => {
      if (inFlight) return;
      inFlight = true;
      refreshAnalyze();
      const body = selectedMood ? { mood: selectedMood } : { text: textEl.value };
      body.save = saveEl.checked;
      try {
        const res = await fetch('/api/analyze', { method: 'POST', headers: headers(), body: JSON.stringify(body) });
        if (!res.ok) throw new Error(await res.text());
        const data = await res.json();
        lastMood = data.mood;
        document.getElementById('result-title').textContent = `${data.emoji} ${data.mood}`;
        document.getElementById('result-message').textContent = data.message;
        const tips = document.getElementById('result-tips');
        tips.innerHTML = '';
        data.tips.forEach((tip) => {
          const li = document.createElement('li');
          li.textContent = tip;
          tips.appendChild(li);
        });
        document.getElementById('notices').textContent = data.notices.map((n) => n.message).join(' ');
        resultEl.style.display = 'block';
      } catch (err) {
        document.getElementById('notices').textContent = `Analysis failed: ${err.message}`;
        resultEl.style.display = 'block';
      } finally {
        inFlight = false;
        refreshAnalyze();
      }
    });

    const closeChat = (keepalive = false) => {
      if (chatId === null) return;
      fetch(`/api/chat/${chatId}`, { method: 'DELETE', keepalive }).catch(() => {});
      chatId = null;
      chatLog.innerHTML = '';
      chatEl.hidden = true;
    };

    document.getElementById('chat-end').addEventListener('click', () => closeChat());
    window.addEventListener('pagehide', () => closeChat(true));

    document.getElementById('open-chat').addEventListener('click', async () => {
      closeChat();
      const res = await fetch('/api/chat', {
        method: 'POST',
        headers: headers(),
        body: JSON.stringify({ mood: lastMood, context: textEl.value || null }),
      });
      const data = await res.json();
      chatId = data.id;
      renderTurns(data.turns);
      chatEl.hidden = false;
    });

    chatText.addEventListener('input', refreshChat);

    chatSend.addEventListener('click', async () => {
      if (chatInFlight || chatId === null) return;
      const text = chatText.value;
      chatInFlight = true;
      chatText.value = '';
      refreshChat();
      try {
        const res = await fetch(`/api/chat/${chatId}/messages`, {
          method: 'POST',
          headers: headers(),
          body: JSON.stringify({ text }),
        });
        if (res.ok) {
          const data = await res.json();
          renderTurns(data.turns);
        }
      } finally {
        chatInFlight = false;
        refreshChat();
      }
    });

    fetch('/api/moods').then((res) => res.json()).then(renderMoods);
  </script>
</body>
</html>
"#;
