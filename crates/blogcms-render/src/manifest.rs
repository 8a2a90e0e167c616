//! Progressive web app assets: the web manifest and the service worker.

use serde_json::{json, Value};

pub const MANIFEST_CONTENT_TYPE: &str = "application/manifest+json";
pub const SERVICE_WORKER_CONTENT_TYPE: &str = "application/javascript";

/// The fixed web app manifest served at `/manifest.json`.
pub fn web_manifest() -> Value {
    json!({
        "name": "Blog CMS",
        "short_name": "Blog",
        "description": "A simple blog content management system",
        "start_url": "/",
        "display": "standalone",
        "background_color": "#667eea",
        "theme_color": "#764ba2",
        "orientation": "portrait-primary",
        "icons": [
            {
                "src": "/static/icons/icon-192x192.png",
                "sizes": "192x192",
                "type": "image/png",
                "purpose": "any maskable"
            },
            {
                "src": "/static/icons/icon-512x512.png",
                "sizes": "512x512",
                "type": "image/png",
                "purpose": "any maskable"
            }
        ]
    })
}

/// Cache-first service worker served at `/service-worker.js`.
pub const SERVICE_WORKER: &str = r#"const CACHE_NAME = 'blog-pwa-v1';
const urlsToCache = [
  '/',
  '/static/css/style.css',
  '/dynamic-styles.css',
  '/static/icons/icon-192x192.png',
  '/static/icons/icon-512x512.png',
  '/manifest.json'
];

self.addEventListener('install', event => {
  event.waitUntil(
    caches.open(CACHE_NAME).then(cache => cache.addAll(urlsToCache))
  );
});

self.addEventListener('fetch', event => {
  event.respondWith(
    caches.match(event.request).then(response => response || fetch(event.request))
  );
});
"#;
