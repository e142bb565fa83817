//! The single-page UI. Served inline so the binary is self-contained.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Visual Riddle Game</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #1f2340 0%, #3b2b57 100%);
            min-height: 100vh;
            display: flex;
            align-items: flex-start;
            justify-content: center;
            padding: 30px 20px;
            color: #eceaf4;
        }

        .container {
            max-width: 860px;
            width: 100%;
        }

        h1 {
            margin-bottom: 6px;
            font-size: 2em;
        }

        .subtitle {
            color: #b6b1cc;
            margin-bottom: 24px;
            font-size: 0.9em;
        }

        .card {
            background: rgba(255,255,255,0.06);
            border: 1px solid rgba(255,255,255,0.12);
            border-radius: 14px;
            padding: 20px;
            margin-bottom: 16px;
        }

        .badge {
            display: inline-block;
            background: rgba(255,255,255,0.12);
            padding: 4px 12px;
            border-radius: 999px;
            font-size: 0.8em;
            font-weight: 600;
            margin-bottom: 10px;
        }

        .controls {
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 12px;
            margin: 12px 0;
        }

        label.small {
            display: block;
            font-size: 0.8em;
            color: #b6b1cc;
            margin-bottom: 4px;
        }

        select, input[type=file] {
            width: 100%;
            padding: 9px;
            border-radius: 8px;
            border: 1px solid rgba(255,255,255,0.2);
            background: rgba(0,0,0,0.25);
            color: #eceaf4;
        }

        .btn {
            background: #6a5ad8;
            color: white;
            border: none;
            padding: 10px 18px;
            border-radius: 8px;
            font-size: 0.95em;
            font-weight: 600;
            cursor: pointer;
        }

        .btn:disabled {
            opacity: 0.5;
            cursor: not-allowed;
        }

        .btn.ghost {
            background: rgba(255,255,255,0.12);
        }

        .progress {
            height: 8px;
            border-radius: 999px;
            background: rgba(255,255,255,0.1);
            overflow: hidden;
            margin-top: 10px;
            display: none;
        }

        .progress > div {
            height: 100%;
            width: 0%;
            background: #8f82e8;
            transition: width 0.2s;
        }

        .preview-wrap {
            position: relative;
            display: none;
            margin-top: 12px;
        }

        .preview-wrap img {
            max-width: 100%;
            border-radius: 10px;
            filter: blur(22px);
            transition: filter 0.5s;
        }

        .preview-wrap.revealed img {
            filter: blur(0);
        }

        .riddle-text {
            font-size: 1.1em;
            line-height: 1.6;
            white-space: pre-wrap;
            margin: 10px 0;
        }

        .meta {
            display: flex;
            gap: 10px;
            flex-wrap: wrap;
            margin-top: 8px;
        }

        details summary {
            cursor: pointer;
            color: #b6b1cc;
            margin-top: 10px;
        }

        .solution {
            margin-top: 10px;
            padding: 12px;
            border-radius: 8px;
            background: rgba(0,0,0,0.25);
            font-size: 0.95em;
        }

        .feedback {
            margin-top: 12px;
            display: none;
            gap: 10px;
        }

        .error {
            background: rgba(200,60,60,0.2);
            border: 1px solid rgba(255,120,120,0.4);
            color: #ffb4b4;
            padding: 12px;
            border-radius: 8px;
            margin-top: 12px;
            display: none;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>🧩 Visual Riddle Game</h1>
        <p class="subtitle">Upload an image, get a riddle, guess before you reveal.</p>

        <div class="card">
            <span class="badge">1) Pick an image and a difficulty</span>
            <input type="file" id="fileInput" accept="image/*">
            <div class="controls">
                <div>
                    <label class="small" for="mode">Mode</label>
                    <select id="mode">
                        <option value="easy">Easy</option>
                        <option value="medium" selected>Medium</option>
                        <option value="hard">Hard</option>
                    </select>
                </div>
                <div>
                    <label class="small" for="detail">Vision detail</label>
                    <select id="detail">
                        <option value="auto" selected>Auto</option>
                        <option value="low">Low (cheaper)</option>
                        <option value="high">High (more detail)</option>
                    </select>
                </div>
            </div>
            <button class="btn" id="generate" disabled>Create riddle</button>
            <div class="progress" id="progress"><div></div></div>
            <div class="error" id="error"></div>
        </div>

        <div class="card">
            <span class="badge">2) Guess first, then reveal</span>
            <div class="preview-wrap" id="previewWrap">
                <img id="preview" alt="Blurred upload">
            </div>
            <div class="meta" id="previewMeta" style="display:none">
                <button class="btn ghost" id="reveal">Reveal</button>
                <span class="badge" id="difficultyBadge"></span>
                <span class="badge" id="focusBadge" style="display:none"></span>
            </div>
        </div>

        <div class="card">
            <span class="badge">3) The riddle</span>
            <div class="riddle-text" id="riddleText">Upload an image to start.</div>
            <div class="meta">
                <button class="btn ghost" id="copy" style="display:none">Copy riddle</button>
            </div>
            <details id="solutionBlock" style="display:none">
                <summary>Show solution</summary>
                <div class="solution">
                    <div><b>Answer:</b> <span id="answerText"></span></div>
                    <div style="margin-top:6px"><b>Explanation:</b> <span id="solutionText"></span></div>
                </div>
            </details>
            <div class="feedback" id="feedback">
                <button class="btn ghost" data-vote="up">👍 Good one</button>
                <button class="btn ghost" data-vote="down">👎 Too weird</button>
                <span class="badge" id="voteThanks" style="display:none">Thanks!</span>
            </div>
        </div>
    </div>

    <script>
        const fileInput = document.getElementById('fileInput');
        const generateBtn = document.getElementById('generate');
        const progress = document.getElementById('progress');
        const progressBar = progress.firstElementChild;
        const errorDiv = document.getElementById('error');
        const previewWrap = document.getElementById('previewWrap');
        const preview = document.getElementById('preview');
        const previewMeta = document.getElementById('previewMeta');
        const revealBtn = document.getElementById('reveal');
        const difficultyBadge = document.getElementById('difficultyBadge');
        const focusBadge = document.getElementById('focusBadge');
        const riddleText = document.getElementById('riddleText');
        const copyBtn = document.getElementById('copy');
        const solutionBlock = document.getElementById('solutionBlock');
        const answerText = document.getElementById('answerText');
        const solutionText = document.getElementById('solutionText');
        const feedback = document.getElementById('feedback');
        const voteThanks = document.getElementById('voteThanks');

        let imageDataUrl = '';
        let revealed = false;

        fileInput.addEventListener('change', () => {
            const file = fileInput.files[0];
            errorDiv.style.display = 'none';
            if (!file || !file.type.startsWith('image/')) {
                generateBtn.disabled = true;
                return;
            }
            const reader = new FileReader();
            reader.onload = (e) => {
                imageDataUrl = e.target.result;
                preview.src = imageDataUrl;
                previewWrap.style.display = 'block';
                previewWrap.classList.remove('revealed');
                revealed = false;
                revealBtn.textContent = 'Reveal';
                previewMeta.style.display = 'flex';
                generateBtn.disabled = false;
            };
            reader.readAsDataURL(file);
        });

        revealBtn.addEventListener('click', () => {
            revealed = !revealed;
            previewWrap.classList.toggle('revealed', revealed);
            revealBtn.textContent = revealed ? 'Hide' : 'Reveal';
        });

        generateBtn.addEventListener('click', async () => {
            generateBtn.disabled = true;
            errorDiv.style.display = 'none';
            progress.style.display = 'block';
            progressBar.style.width = '0%';
            previewWrap.classList.remove('revealed');
            revealed = false;
            revealBtn.textContent = 'Reveal';

            const start = Date.now();
            const timer = setInterval(() => {
                const p = Math.min(95, Math.floor(((Date.now() - start) / 2500) * 100));
                progressBar.style.width = p + '%';
            }, 80);

            try {
                const res = await fetch('/api/riddle', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        imageDataUrl,
                        mode: document.getElementById('mode').value,
                        detail: document.getElementById('detail').value,
                        includeSolution: true
                    })
                });
                const json = await res.json();
                if (!json.ok) throw new Error(json.error || 'Failed to generate riddle.');

                progressBar.style.width = '100%';
                riddleText.textContent = json.riddle || '';
                difficultyBadge.textContent = 'Difficulty: ' + (json.difficulty || 'medium');
                if (json.focus) {
                    focusBadge.textContent = 'Focus: ' + json.focus;
                    focusBadge.style.display = 'inline-block';
                }
                answerText.textContent = json.answer || '(unknown)';
                solutionText.textContent = json.solution || '(none)';
                solutionBlock.style.display = 'block';
                solutionBlock.open = false;
                copyBtn.style.display = 'inline-block';
                feedback.style.display = 'flex';
                voteThanks.style.display = 'none';
            } catch (err) {
                errorDiv.textContent = '❌ ' + err.message;
                errorDiv.style.display = 'block';
            } finally {
                clearInterval(timer);
                progress.style.display = 'none';
                generateBtn.disabled = false;
            }
        });

        copyBtn.addEventListener('click', async () => {
            try {
                await navigator.clipboard.writeText(riddleText.textContent);
                copyBtn.textContent = '✅ Copied';
                setTimeout(() => { copyBtn.textContent = 'Copy riddle'; }, 1200);
            } catch (_) {
                // clipboard unavailable; nothing to do
            }
        });

        feedback.addEventListener('click', (e) => {
            if (e.target.dataset.vote) {
                voteThanks.style.display = 'inline-block';
            }
        });
    </script>
</body>
</html>
        "#,
    )
}
