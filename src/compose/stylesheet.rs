//! Fixed print style sheet
//!
//! The CSS template is constant except for two data-driven points: the
//! alternating table-row shade and the page-break behavior of top-level
//! headings. Everything else (print-section page breaks, backlink chrome,
//! float classes, A4 page geometry) never varies between runs.

use crate::config::PrintConfig;

const ROW_SHADE_SLOT: &str = "@row-shade@";
const HEADING_BREAK_SLOT: &str = "@heading-break@";

const BOOK_CSS_TEMPLATE: &str = r#"
body {
    overflow: hidden;
    background: url(https://www.dndbeyond.com/attachments/0/84/background_texture.png) #f9f9f9 !important;
}
.print-hidden {
    display: flex;
    justify-content: center;
    align-items: center;
    height: 100%;
    font-size: 2rem;
}
.flexible-double-column > * {
    flex-basis: 0;
    flex-grow: 1;
}
.flexible-double-column__column-width-35pct, .flexible-double-column__column-width-45pct {
    flex-basis: initial !important;
    flex-grow: initial !important;
}
.title-page, .cover-img {
    text-align: center;
    height: 100vh;
    width: 100vw;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
}
.title-container {
    flex: 1;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
}
.title {
    font-size: 3rem;
    font-weight: bold;
    margin-bottom: 2rem;
}
.username {
    font-size: 1rem;
}
.printed-with-hint {
    font-size: 0.7rem;
}
a.backlink {
    float: right;
    border: solid 1px #dddddd;
    padding: 0 1rem;
    color: #bbbbbb !important;
    border-radius: 8px;
}
table {
    width: 100%;
    text-align: center;
    margin: 20px 0;
    border-collapse: collapse;
}
thead {
    border-bottom: 3px solid #d0cac5;
}
thead tr:nth-child(odd) {
    background-color: white;
}
tr:nth-child(odd) {
    background-color: @row-shade@;
}
td {
    border: 1px solid #e0dcdc;
    padding: 5px 5px;
}
th {
    border: 1px solid #e0dcdc;
    padding: 12px 10px;
}
h1 {
    border-bottom: 3px solid #47D18C;
    margin-bottom: 0.5em;
}
h2, h3 {
    border-bottom: 1px solid #47D18C;
    margin-bottom: 0.5em;
}
.compendium-toc-full-text h3, .compendium-toc-full-text ul {
    break-after: avoid !important;
    break-before: initial !important;
}
h4 {
    font-size: 18px;
}
figcaption {
    text-align: center;
}
img {
    max-width: 100%;
}
h1, h2.compendium-hr {
    break-before: @heading-break@;
    page-break-before: @heading-break@;
}
.print-section {
    break-after: always;
    page-break-after: always;
}
caption {
    break-before: avoid;
    page-break-before: avoid;
}
h1, h2, h3, h4 {
    break-after: avoid;
    page-break-after: avoid;
}
aside, blockquote, table, ul, ol, figure, img {
    break-inside: avoid;
    page-break-inside: avoid;
}
blockquote.adventure-read-aloud-text {
    background-color: white;
}
.compendium-image-left {
    float: left;
    display: block;
}
.compendium-image-right {
    float: right;
    display: block;
}
.monster-image-left {
    float: left;
    display: block;
}
.monster-image-right {
    float: right;
    display: block;
}
img.compendium-center-banner-img {
    width: 100%;
}
@page {
    size: 210mm 297mm;
    margin: 30px;
}
@media print {
    .print-hidden {
        display: none !important;
    }
    .print {
        display: initial;
    }
}
"#;

/// Render the book style sheet for one configuration
#[must_use]
pub fn book_css(config: &PrintConfig) -> String {
    let row_shade = if config.stripped_tables {
        "#FAF8F7"
    } else {
        "white"
    };
    let heading_break = if config.heading_on_new_page {
        "always"
    } else {
        "initial"
    };
    BOOK_CSS_TEMPLATE
        .replace(ROW_SHADE_SLOT, row_shade)
        .replace(HEADING_BREAK_SLOT, heading_break)
}
