// routes/home.rs
// GET / -> minimal page with login and signup forms posting JSON.

use axum::response::Html;

pub async fn home() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Pocket Budget</title>
</head>
<body>
  <main>
    <h1>Pocket Budget</h1>
    <section>
      <h2>Log in</h2>
      <form id="login-form">
        <label>
          Email
          <input id="login-email" name="email" type="email" required>
        </label>
        <label>
          Code
          <input id="login-code" name="code" inputmode="numeric" pattern="\d*" required>
        </label>
        <button type="submit">Log in</button>
      </form>
    </section>
    <section>
      <h2>Sign up</h2>
      <p>Creates a 15-day trial account and shows the authenticator enrollment URL.</p>
      <form id="signup-form">
        <label>
          Email
          <input id="signup-email" name="email" type="email" required>
        </label>
        <label>
          Name
          <input id="signup-name" name="display_name" required>
        </label>
        <button type="submit">Start trial</button>
      </form>
    </section>
    <pre id="result"></pre>
  </main>
  <script>
    const result = document.getElementById('result');

    async function postJson(url, body) {
      const response = await fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body)
      });
      const data = await response.json();
      result.textContent = JSON.stringify(data, null, 2);
      return { response, data };
    }

    document.getElementById('login-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = event.target;
      try {
        const { response } = await postJson('/login', {
          email: form.email.value.trim(),
          code: form.code.value.trim()
        });
        if (response.ok) {
          window.location.href = '/dashboard';
        }
      } catch (err) {
        result.textContent = String(err);
      }
    });

    document.getElementById('signup-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = event.target;
      try {
        await postJson('/signup', {
          email: form.email.value.trim(),
          display_name: form.display_name.value.trim()
        });
      } catch (err) {
        result.textContent = String(err);
      }
    });
  </script>
</body>
</html>"#,
    )
}
