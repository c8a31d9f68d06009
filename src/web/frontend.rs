//! Embedded HTML/CSS/JS for the sawah web pages.
//!
//! Both pages are compiled into the binary as string constants.
//! No external assets, no build tools, no CDN dependencies.

/// Live monitoring page: readings, pump controls and the sliding chart.
pub const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>sawah · Live</title>
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
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 1100px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 24px; padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 20px; font-weight: 600; }
header h1 span { color: var(--green); }
header a { color: var(--accent); text-decoration: none; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 24px; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; }
.card .label { color: var(--text-muted); font-size: 12px; text-transform: uppercase; letter-spacing: 0.5px; }
.card .value { font-size: 26px; font-weight: 600; margin-top: 4px; }
.status-on { color: var(--green); }
.status-off { color: var(--red); }
.sangat-kering { color: var(--red); }
.kering { color: var(--yellow); }
.lembab { color: var(--green); }
.basah { color: var(--accent); }
.sangat-basah { color: var(--cyan); }
.category-unknown { color: var(--text-muted); }
.controls { display: flex; gap: 12px; margin-bottom: 24px; }
button { background: var(--surface); color: var(--text); border: 1px solid var(--border); border-radius: var(--radius); padding: 8px 20px; font-size: 14px; cursor: pointer; }
button:hover:not(:disabled) { border-color: var(--accent); }
button:disabled { opacity: 0.4; cursor: not-allowed; }
button.btn-warning { border-color: var(--yellow); color: var(--yellow); }
.panel { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; margin-bottom: 24px; }
canvas { width: 100%; height: 280px; }
.legend { display: flex; gap: 16px; font-size: 12px; color: var(--text-muted); margin-top: 8px; }
.legend .m { color: var(--accent); }
.legend .l { color: var(--cyan); }
#log { font-family: var(--mono); font-size: 13px; color: var(--text-muted); }
#log.error { color: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span>sawah</span> · live irrigation</h1>
    <a href="/analysis.html">Daily analysis →</a>
  </header>

  <div class="cards">
    <div class="card"><div class="label">Soil moisture</div><div class="value" id="moisture">--</div></div>
    <div class="card"><div class="label">Water level</div><div class="value" id="level">--</div></div>
    <div class="card"><div class="label">Pump</div><div class="value" id="pump">--</div></div>
    <div class="card"><div class="label">Category</div><div class="value" id="category">--</div></div>
  </div>

  <div class="controls">
    <button id="btn-on" title="Switch the pump on manually.">Pump ON</button>
    <button id="btn-off">Pump OFF</button>
  </div>

  <div class="panel">
    <canvas id="chart" width="1000" height="280"></canvas>
    <div class="legend"><span class="m">■ moisture (%)</span><span class="l">■ water level (cm)</span></div>
  </div>

  <div class="panel"><div id="log">Waiting for the first reading…</div></div>
</div>

<script>
let settings = { poll_interval_ms: 2000, axes: { moisture_max: 100, level_max: 20 } };

function applyGate(gate) {
  const btn = document.getElementById('btn-on');
  btn.disabled = gate.disabled;
  btn.classList.toggle('btn-warning', gate.warning);
  btn.title = gate.tooltip;
}

function applyReading(r) {
  document.getElementById('moisture').textContent = r.moisture_text;
  document.getElementById('level').textContent = r.level_text;
  const pump = document.getElementById('pump');
  pump.textContent = r.pump_state;
  pump.className = 'value ' + r.indicator_class;
  const cat = document.getElementById('category');
  cat.textContent = r.category_label;
  cat.className = 'value ' + r.category_class;
  const log = document.getElementById('log');
  log.textContent = r.log_text;
  log.className = '';
}

function drawSeries(ctx, values, max, color, w, h) {
  if (values.length === 0) return;
  const top = Math.max(max, ...values);
  const step = values.length > 1 ? w / (values.length - 1) : 0;
  ctx.strokeStyle = color;
  ctx.lineWidth = 2;
  ctx.beginPath();
  values.forEach((v, i) => {
    const x = i * step;
    const y = h - (v / top) * (h - 10);
    if (i === 0) ctx.moveTo(x, y); else ctx.lineTo(x, y);
  });
  ctx.stroke();
}

function drawChart(chart) {
  const canvas = document.getElementById('chart');
  const ctx = canvas.getContext('2d');
  const w = canvas.width, h = canvas.height - 20;
  ctx.clearRect(0, 0, canvas.width, canvas.height);
  ctx.strokeStyle = '#30363d';
  ctx.lineWidth = 1;
  for (let i = 0; i <= 4; i++) {
    const y = (h / 4) * i;
    ctx.beginPath(); ctx.moveTo(0, y); ctx.lineTo(w, y); ctx.stroke();
  }
  drawSeries(ctx, chart.moisture, settings.axes.moisture_max, '#58a6ff', w, h);
  drawSeries(ctx, chart.level, settings.axes.level_max, '#39d2c0', w, h);
  ctx.fillStyle = '#8b949e';
  ctx.font = '11px sans-serif';
  if (chart.labels.length > 0) {
    ctx.fillText(chart.labels[0], 0, canvas.height - 4);
    const last = chart.labels[chart.labels.length - 1];
    ctx.fillText(last, w - ctx.measureText(last).width, canvas.height - 4);
  }
}

function applyLive(data) {
  if (data.reading) applyReading(data.reading);
  if (data.gate) applyGate(data.gate);
  if (data.chart) drawChart(data.chart);
  if (data.error) {
    const log = document.getElementById('log');
    log.textContent = data.error;
    log.className = 'error';
  }
}

async function poll() {
  try {
    const res = await fetch('/api/live');
    applyLive(await res.json());
  } catch (e) {
    console.error('live poll failed', e);
    const log = document.getElementById('log');
    log.textContent = 'Error: cannot reach the device. Make sure the device service is running.';
    log.className = 'error';
  }
}

async function sendCommand(command) {
  try {
    const res = await fetch('/api/control', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ command }),
    });
    const data = await res.json();
    if (res.ok || res.status === 409) applyLive(data);
    else console.error('control failed', data);
  } catch (e) {
    console.error('control failed', e);
  }
}

document.getElementById('btn-on').addEventListener('click', () => sendCommand('ON'));
document.getElementById('btn-off').addEventListener('click', () => sendCommand('OFF'));

(async () => {
  try {
    settings = await (await fetch('/api/settings')).json();
  } catch (e) {
    console.error('settings unavailable, using defaults', e);
  }
  poll();
  setInterval(poll, settings.poll_interval_ms);
})();
</script>
</body>
</html>
"##;

/// Daily analysis page: summary fields, print and CSV export.
pub const ANALYSIS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>sawah · Daily analysis</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 800px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 24px; padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 20px; font-weight: 600; }
header h1 span { color: var(--green); }
header a { color: var(--accent); text-decoration: none; }
table { width: 100%; border-collapse: collapse; background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); margin-bottom: 24px; }
td { padding: 10px 16px; border-bottom: 1px solid var(--border); }
td:last-child { text-align: right; font-weight: 600; }
.actions { display: flex; gap: 12px; }
button { background: var(--surface); color: var(--text); border: 1px solid var(--border); border-radius: var(--radius); padding: 8px 20px; font-size: 14px; cursor: pointer; }
button:hover { border-color: var(--accent); }
@media print {
  body { background: #fff; color: #000; }
  header a, .actions { display: none; }
  table { background: #fff; border-color: #000; }
  td { border-color: #000; }
}
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span>sawah</span> · daily irrigation analysis</h1>
    <a href="/">← Live dashboard</a>
  </header>

  <table>
    <tr><td>Total pump on time</td><td id="total_pump_time">--</td></tr>
    <tr><td>Total records</td><td id="total_records">--</td></tr>
    <tr><td>Average moisture (%)</td><td id="avg_moisture">--</td></tr>
    <tr><td>Maximum moisture (%)</td><td id="max_moisture">--</td></tr>
    <tr><td>Minimum moisture (%)</td><td id="min_moisture">--</td></tr>
    <tr><td>Average water level (cm)</td><td id="avg_level">--</td></tr>
    <tr><td>Maximum water level (cm)</td><td id="max_level">--</td></tr>
    <tr><td>Minimum water level (cm)</td><td id="min_level">--</td></tr>
  </table>

  <div class="actions">
    <button id="btn-print">Print</button>
    <button id="btn-export">Export CSV</button>
  </div>
</div>

<script>
const FIELDS = ['total_pump_time', 'total_records', 'avg_moisture', 'max_moisture',
                'min_moisture', 'avg_level', 'max_level', 'min_level'];

function applyAnalysis(data) {
  if (data.fields) {
    FIELDS.forEach(id => { document.getElementById(id).textContent = data.fields[id]; });
  }
  if (data.alert) alert(data.alert);
}

async function loadAnalysis() {
  try {
    applyAnalysis(await (await fetch('/api/analysis')).json());
  } catch (e) {
    console.error('analysis fetch failed', e);
    alert('Cannot reach the device. Make sure the device service is running.');
  }
}

async function exportCsv() {
  try {
    const res = await fetch('/api/analysis/export.csv');
    if (!res.ok) {
      applyAnalysis(await res.json());
      return;
    }
    const blob = await res.blob();
    const disposition = res.headers.get('Content-Disposition') || '';
    const match = disposition.match(/filename="([^"]+)"/);
    const url = URL.createObjectURL(blob);
    const a = document.createElement('a');
    a.href = url;
    a.download = match ? match[1] : 'analysis.csv';
    document.body.appendChild(a);
    a.click();
    document.body.removeChild(a);
    URL.revokeObjectURL(url);
  } catch (e) {
    console.error('export failed', e);
  }
}

document.getElementById('btn-print').addEventListener('click', () => window.print());
document.getElementById('btn-export').addEventListener('click', exportCsv);

loadAnalysis();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_reference_their_api_routes() {
        assert!(DASHBOARD_HTML.contains("/api/live"));
        assert!(DASHBOARD_HTML.contains("/api/control"));
        assert!(ANALYSIS_HTML.contains("/api/analysis/export.csv"));
    }

    #[test]
    fn pages_report_an_unreachable_dashboard_server() {
        let log_line = format!("log.textContent = '{}';", crate::dashboard::CONNECTIVITY_ERROR);
        assert!(DASHBOARD_HTML.contains(&log_line));

        let alert = format!("alert('{}');", crate::analysis::CONNECTIVITY_ALERT);
        assert!(ANALYSIS_HTML.contains(&alert));
    }

    #[test]
    fn analysis_page_has_every_field() {
        for id in [
            "total_pump_time",
            "total_records",
            "avg_moisture",
            "max_moisture",
            "min_moisture",
            "avg_level",
            "max_level",
            "min_level",
        ] {
            assert!(ANALYSIS_HTML.contains(&format!("id=\"{id}\"")), "{id}");
        }
    }
}
