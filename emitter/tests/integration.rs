use emitter::driver::{Dispatch, Emitter, Warnings, run_emitter};
use emitter::{
    CompositeResult, DetectedTarget, EmitError, InterpreterConfig, Interpreter, StylesheetMode,
    detect_target, interpret,
};
use wahy::{ParsedCommand, Target, split_sections};

fn html(source: &str) -> String {
    let result = interpret(source);
    assert!(result.success, "unexpected failure: {:?}", result.error);
    result.html.expect("html output")
}

fn css(source: &str) -> String {
    let result = interpret(&format!("ابدأ_CSS\n{}\nأنهِ_CSS", source));
    result.css.expect("css output")
}

fn js(source: &str) -> String {
    let result = interpret(&format!("ابدأ_JS\n{}\nأنهِ_JS", source));
    result.javascript.expect("javascript output")
}

fn combined(result: &CompositeResult) -> &str {
    result.combined_output.as_deref().expect("combined output")
}

// ---------------------------------------------------------------------------
// HTML emitter
// ---------------------------------------------------------------------------

#[test]
fn explicit_page_lifecycle() {
    let out = html("افتح صفحة \"t\"\nأضف عنوان \"H\"\nأغلق صفحة");
    assert!(out.starts_with("<!DOCTYPE html>"));
    assert!(out.contains("<html dir=\"rtl\" lang=\"ar\">"));
    assert!(out.contains("<title>t</title>"));
    assert!(out.contains("<h1>H</h1>"));
    assert!(out.ends_with("</html>"));
}

#[test]
fn content_auto_opens_page() {
    let out = html("أضف فقرة \"hi\"");
    assert!(out.contains("<title>صفحة وحي</title>"));
    assert!(out.contains("<p>hi</p>"));
    assert!(out.ends_with("</body>\n</html>"));
}

#[test]
fn unclosed_list_is_closed_at_end() {
    let result = interpret("ابدأ قائمة\nأضف عنصر \"a\"");
    assert!(result.success);
    assert!(result.warnings.is_empty());
    let out = result.html.unwrap();
    assert!(out.contains("<ul>\n  <li>a</li>\n</ul>\n</body>\n</html>"));
}

#[test]
fn closing_list_with_nothing_open_fails_on_its_line() {
    let result = interpret("أضف فقرة قبل\nأنهِ قائمة\nأضف فقرة بعد");
    assert!(!result.success);
    assert_eq!(result.line_number, Some(2));
    assert_eq!(
        result.error.as_deref(),
        Some("cannot close list: nothing is open")
    );
    let out = combined(&result);
    assert!(out.contains("<p>قبل</p>"));
    assert!(!out.contains("<p>بعد</p>"));
    assert!(out.ends_with("</html>"));
}

#[test]
fn key_precedence_prefers_verb_noun() {
    let out = html("أضف عنوان \"X\"");
    assert!(out.contains("<h1>X</h1>"));
}

#[test]
fn free_text_is_escaped_once() {
    let out = html("افتح صفحة <&>\nأضف فقرة <b>&'</b>\nأضف رابط \"a&b\" \"https://x.y/?a=1&b=2\"");
    assert!(out.contains("<title>&lt;&amp;&gt;</title>"));
    assert!(out.contains("<p>&lt;b&gt;&amp;&#x27;&lt;/b&gt;</p>"));
    assert!(out.contains(
        "<a href=\"https://x.y/?a=1&amp;b=2\" target=\"_blank\">a&amp;b</a>"
    ));
    assert!(!out.contains("&amp;amp;"));
}

#[test]
fn blocks_close_by_position_not_kind() {
    let result = interpret("ابدأ قسم\nابدأ قائمة\nأضف عنصر أ\nأنهِ قسم\nأنهِ قائمة");
    assert!(result.success);
    let out = result.html.unwrap();
    let ul_close = out.find("</ul>").unwrap();
    let div_close = out.find("</div>").unwrap();
    assert!(ul_close < div_close);
}

#[test]
fn balanced_blocks_leave_nothing_open() {
    let out = html(
        "ابدأ قسم مميز\nابدأ قائمة_مرقمة\nعنصر أ\nعنصر ب\nأنهِ قائمة\nأنهِ قسم\nأغلق صفحة",
    );
    assert!(out.contains("<div class=\"wahy-section مميز\">\n  <ol>\n    <li>أ</li>"));
    assert!(out.contains("  </ol>\n</div>\n</body>"));
}

#[test]
fn list_item_outside_list_warns() {
    let result = interpret("أضف عنصر يتيم");
    assert!(result.success);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].starts_with("[HTML] line 1:"));
    assert!(!result.html.unwrap().contains("<li>"));
}

#[test]
fn unknown_commands_warn_once_each_and_continue() {
    let result = interpret("أضف فقرة أ\nطير عاليا\nطير\nأضف فقرة ب");
    assert!(result.success);
    assert_eq!(
        result.warnings,
        vec![
            "[HTML] line 2: unknown HTML command: طير",
            "[HTML] line 3: unknown HTML command: طير",
        ]
    );
    let out = result.html.unwrap();
    assert!(out.contains("<p>أ</p>"));
    assert!(out.contains("<p>ب</p>"));
}

#[test]
fn reopening_and_reclosing_are_warnings() {
    let result = interpret("افتح صفحة أ\nافتح صفحة ب\nأغلق صفحة\nأغلق صفحة");
    assert!(result.success);
    assert_eq!(result.warnings.len(), 2);
    assert!(result.warnings[0].contains("page is already open"));
    assert!(result.warnings[1].contains("page is already closed"));
    let out = result.html.unwrap();
    assert_eq!(out.matches("<!DOCTYPE html>").count(), 1);
    assert_eq!(out.matches("</html>").count(), 1);
}

#[test]
fn content_after_close_is_structural() {
    let result = interpret("أضف فقرة أ\nأغلق صفحة\nأضف فقرة ب");
    assert!(!result.success);
    assert_eq!(result.line_number, Some(3));
    assert!(result.error.unwrap().contains("already closed"));
}

#[test]
fn style_overrides_stack_in_order() {
    let out = html("غيّر لون_الخلفية إلى أحمر\nغيّر لون_الخلفية إلى أزرق");
    let red = out.find("background-color: أحمر;").unwrap();
    let blue = out.find("background-color: أزرق;").unwrap();
    assert!(red < blue);
    assert_eq!(out.matches("<style>body {").count(), 2);
}

#[test]
fn style_override_values_are_raw_css() {
    let result = interpret("غيّر الخط إلى Times\nغيّر لون_النص إلى rgb(0,0,0)");
    assert!(result.warnings.is_empty());
    let out = result.html.unwrap();
    assert!(out.contains("<style>body { font-family: 'Times', sans-serif; }</style>"));
    assert!(out.contains("<style>body { color: rgb(0,0,0); }</style>"));
}

#[test]
fn font_override_quotes_are_escaped_for_css() {
    let out = html("غيّر الخط إلى \"O'Font\"");
    assert!(out.contains("font-family: 'O\\'Font', sans-serif;"));
    assert!(!out.contains("&#x27;"));
}

#[test]
fn style_override_refuses_angle_bracket() {
    let result = interpret("أضف فقرة أ\nغيّر لون_الخلفية إلى \"red</style><b>\"");
    assert!(result.success);
    assert_eq!(
        result.warnings,
        vec!["[HTML] line 2: style value may not contain '<'; override skipped"]
    );
    let out = result.html.unwrap();
    assert!(!out.contains("<b>"));
    assert!(!out.contains("<style>"));
}

#[test]
fn tables_open_rows_implicitly() {
    let out = html("ابدأ جدول\nخانة أ\nصف\nخانة ب\nأنهِ جدول");
    assert!(out.contains(
        "<table>\n  <tr>\n    <td>أ</td>\n  </tr>\n  <tr>\n    <td>ب</td>\n  </tr>\n</table>"
    ));
}

#[test]
fn forms_and_media() {
    let out = html(
        "أضف صورة cat.png قطة\nأضف زر إرسال \"send()\"\nأضف مدخل_نص الاسم \"اكتب اسمك\"\nأضف مربع_اختيار أ موافق\nأضف مربع_اختيار ب",
    );
    assert!(out.contains("<img src=\"cat.png\" alt=\"قطة\">"));
    assert!(out.contains("<button class=\"wahy-button\" onclick=\"send()\">إرسال</button>"));
    assert!(out.contains(
        "<input type=\"text\" name=\"الاسم\" class=\"wahy-input\" placeholder=\"اكتب اسمك\">"
    ));
    assert!(out.contains("<label for=\"wahy-checkbox-1\">موافق</label>"));
    assert!(out.contains("id=\"wahy-checkbox-2\""));
}

#[test]
fn external_stylesheet_from_toml() {
    let config: InterpreterConfig =
        toml::from_str("stylesheet = \"external\"\nstylesheet_href = \"site.css\"").unwrap();
    assert_eq!(config.stylesheet, StylesheetMode::External);

    let result = Interpreter::new(config).interpret("أضف فقرة أ");
    let out = result.html.unwrap();
    assert!(out.contains("<link rel=\"stylesheet\" href=\"site.css\">"));
    assert!(!out.contains("wahy-base"));
}

#[test]
fn config_rejects_unknown_keys() {
    assert!(toml::from_str::<InterpreterConfig>("colour = \"red\"").is_err());
    assert_eq!(
        toml::from_str::<InterpreterConfig>("").unwrap(),
        InterpreterConfig::default()
    );
}

// ---------------------------------------------------------------------------
// CSS emitter
// ---------------------------------------------------------------------------

#[test]
fn select_then_rule() {
    assert_eq!(
        css("اختر body\nلون_الخلفية lightblue"),
        "body {\n  background-color: lightblue;\n}"
    );
}

#[test]
fn selecting_closes_previous_rule() {
    assert_eq!(
        css("اختر h1\nلون red\nحدد .box p\nالهامش 0 auto"),
        "h1 {\n  color: red;\n}\n.box p {\n  margin: 0 auto;\n}"
    );
}

#[test]
fn rule_without_selector_targets_body() {
    assert_eq!(css("محاذاة_النص وسط"), "body {\n  text-align: center;\n}");
}

#[test]
fn media_query_nests_rules() {
    assert_eq!(
        css("استعلام_الوسائط (max-width: 600px)\nاختر p\nحجم_الخط 14px\nأنهِ_الاستعلام"),
        "@media (max-width: 600px) {\n  p {\n    font-size: 14px;\n  }\n}"
    );
}

#[test]
fn closing_media_with_none_open_degrades_to_warning() {
    let result = interpret("أضف فقرة أ\nابدأ_CSS\nلون red\nأنهِ_الاستعلام\nأنهِ_CSS");
    assert!(result.success);
    assert_eq!(
        result.warnings,
        vec!["[CSS] line 4: cannot close media query: nothing is open"]
    );
    assert!(combined(&result).contains("color: red;"));
}

#[test]
fn stylesheet_without_rules_is_sentinel() {
    let result = interpret("ابدأ_CSS\nشيء غريب\nأنهِ_CSS");
    assert_eq!(result.css.as_deref(), Some("/* لا توجد قواعد CSS */"));
    assert_eq!(result.warnings, vec!["[CSS] line 2: unknown CSS command: شيء"]);
}

#[test]
fn font_and_background_helpers() {
    assert_eq!(
        css("الخط Tahoma\nصورة_الخلفية bg.png\nفلكس"),
        "body {\n  font-family: 'Tahoma', sans-serif;\n  background-image: url(bg.png);\n  display: flex;\n}"
    );
}

#[test]
fn rule_value_closing_style_is_skipped() {
    let result = interpret("ابدأ_CSS\nقاعدة content \"</style><b>\"\nلون red\nأنهِ_CSS");
    assert_eq!(
        result.warnings,
        vec!["[CSS] line 2: '</' would end the style block; line skipped"]
    );
    assert_eq!(result.css.as_deref(), Some("body {\n  color: red;\n}"));
    assert_eq!(combined(&result).matches("</style>").count(), 1);
}

// ---------------------------------------------------------------------------
// JavaScript emitter
// ---------------------------------------------------------------------------

#[test]
fn conditionals_with_operator_substitution() {
    assert_eq!(
        js("متغير س 10\nإذا س أكبر_من 5\nاطبع \"كبير\"\nوإلا\nاطبع \"صغير\"\nأنهِ_إذا"),
        "let س = 10;\nif (س > 5) {\n  console.log(\"كبير\");\n} else {\n  console.log(\"صغير\");\n}"
    );
}

#[test]
fn else_if_both_spellings() {
    let out = js("إذا س يساوي 1\nوإلا_إذا س يساوي 2\nوإلا إذا س يساوي 3\nأنهِ_إذا");
    assert!(out.contains("} else if (س == 2) {"));
    assert!(out.contains("} else if (س == 3) {"));
}

#[test]
fn quoted_condition_substitutes_whole_words_only() {
    assert_eq!(
        js("طالما \"(أ أصغر_من 3) و ليس تم\"\nأنهِ_حلقة"),
        "while ((أ < 3) && ! تم) {\n}"
    );
    assert_eq!(js("إذا قيمة_يساوي\nأنهِ_إذا"), "if (قيمة_يساوي) {\n}");
}

#[test]
fn bare_values_are_coerced_not_quoted() {
    assert_eq!(
        js("اطبع س صحيح فارغ 3.5 \"نص\""),
        "console.log(س, true, null, 3.5, \"نص\");"
    );
}

#[test]
fn functions_and_loops() {
    assert_eq!(
        js("دالة جمع أ ب\nارجع أ\nأنهِ_دالة\nكرر i 1 10\nاستدعي جمع i 2\nأنهِ_حلقة\nلكل x قائمة\nاكسر\nأنهِ_حلقة"),
        "function جمع(أ, ب) {\n  return أ;\n}\nfor (let i = 1; i <= 10; i++) {\n  جمع(i, 2);\n}\nfor (let x of قائمة) {\n  break;\n}"
    );
}

#[test]
fn mismatched_closer_only_tracks_depth() {
    let result = interpret("ابدأ_JS\nدالة f\nأنهِ_حلقة\nأنهِ_JS");
    assert!(result.warnings.is_empty());
    assert_eq!(result.javascript.as_deref(), Some("function f() {\n}"));
}

#[test]
fn closing_at_depth_zero_degrades_to_warning() {
    let result = interpret("أضف فقرة أ\nابدأ_JS\nاطبع 1\nأنهِ_دالة\nاطبع 2\nأنهِ_JS");
    assert!(result.success);
    assert_eq!(
        result.warnings,
        vec!["[JavaScript] line 4: cannot close function: nothing is open"]
    );
    assert_eq!(result.javascript.as_deref(), Some("console.log(1);"));
}

#[test]
fn open_blocks_are_closed_with_warning() {
    let result = interpret("ابدأ_JS\nإذا صحيح\nإذا خطأ\nأنهِ_JS");
    assert_eq!(result.javascript.as_deref(), Some("if (true) {\n  if (false) {\n  }\n}"));
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("2 block(s) left open"));
}

#[test]
fn dom_events_and_timers() {
    assert_eq!(
        js("عند_الضغط btn \"alert('hi')\"\nانتظر \"console.log(1)\" 500"),
        "document.getElementById('btn').onclick = function() {\n  alert('hi');\n};\nsetTimeout(function() {\n  console.log(1);\n}, 500);"
    );
}

#[test]
fn raw_code_keeps_source_text() {
    assert_eq!(js("كود_خام console.log(\"hi there\")"), "console.log(\"hi there\")");
    assert_eq!(js("كود_خام \"let x = 1;\""), "let x = 1;");
}

#[test]
fn handlers_and_comments_keep_quotes() {
    assert_eq!(
        js("عند_الضغط زر1 alert(\"hi\")\nتعليق قال \"مرحبا\"  هنا"),
        "document.getElementById('زر1').onclick = function() {\n  alert(\"hi\");\n};\n// قال \"مرحبا\"  هنا"
    );
}

#[test]
fn string_literals_cannot_close_the_script() {
    assert_eq!(
        js("اطبع \"</script><h1>x</h1>\""),
        "console.log(\"<\\/script><h1>x<\\/h1>\");"
    );
}

#[test]
fn dom_ids_are_single_quote_escaped() {
    assert_eq!(
        js("اختر_عنصر it's عنصري"),
        "let عنصري = document.getElementById('it\\'s');"
    );
}

#[test]
fn arrays_objects_and_math() {
    assert_eq!(
        js("مصفوفة أرقام 1 2 3\nأضف_للمصفوفة أرقام 4\nكائن شخص\nخاصية شخص اسم \"علي\"\nاجمع م 2 3"),
        "let أرقام = [1, 2, 3];\nأرقام.push(4);\nlet شخص = {};\nشخص.اسم = \"علي\";\nlet م = 2 + 3;"
    );
}

#[test]
fn script_without_code_is_sentinel() {
    let result = interpret("ابدأ_JS\n# فقط تعليق\nأنهِ_JS");
    assert_eq!(result.javascript.as_deref(), Some("// لا يوجد كود JavaScript"));
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[test]
fn composite_injects_one_style_and_one_script() {
    let result = interpret(
        "افتح صفحة ع\nأضف فقرة أ\nأغلق صفحة\nابدأ_CSS\nاختر p\nلون red\nأنهِ_CSS\nابدأ_JS\nاطبع 1\nأنهِ_JS",
    );
    assert!(result.success);
    let out = combined(&result);

    assert_eq!(out.matches("<style>").count(), 1);
    assert_eq!(out.matches("<script>").count(), 1);
    assert!(out.find("<style>").unwrap() < out.find("</head>").unwrap());
    assert!(out.find("<script>").unwrap() < out.find("</body>").unwrap());
    assert!(out.contains("  </style>\n</head>"));
    assert!(out.contains("  </script>\n</body>"));
}

#[test]
fn generated_code_never_ends_its_element() {
    let result = interpret(
        "افتح صفحة ع\nأغلق صفحة\nابدأ_JS\nاطبع \"</script><h1>x</h1>\"\nكود_خام document.write(\"</SCRIPT>\")\nأنهِ_JS",
    );
    assert!(result.success);
    let out = combined(&result);
    assert_eq!(out.to_ascii_lowercase().matches("</script>").count(), 1);
    assert!(out.contains("document.write(\"<\\/SCRIPT>\")"));
    assert!(!out.contains("<h1>x</h1>"));
}

#[test]
fn html_interrupted_by_css_is_one_document() {
    let result = interpret("افتح صفحة ع\nابدأ_CSS\nلون red\nأنهِ_CSS\nأضف فقرة ب");
    let out = result.html.unwrap();
    assert_eq!(out.matches("<!DOCTYPE html>").count(), 1);
    assert!(out.contains("<p>ب</p>"));
}

#[test]
fn fallback_document_without_html() {
    let result = interpret("ابدأ_CSS\nلون red\nأنهِ_CSS");
    assert!(result.success);
    assert!(result.html.is_none());
    let out = combined(&result);
    assert!(out.starts_with("<!DOCTYPE html>"));
    assert!(out.contains("<title>مشروع وحي</title>"));
    assert!(out.contains("<h1>مرحباً بك في لغة وحي</h1>"));
    assert!(out.contains("  <style>\nbody {\n  color: red;\n}\n  </style>"));
    assert!(!out.contains("<script>"));
}

#[test]
fn empty_source_still_produces_a_document() {
    let result = interpret("");
    assert!(result.success);
    assert!(combined(&result).ends_with("</html>"));
}

#[test]
fn html_failure_keeps_css_and_js() {
    let result = interpret("أنهِ قسم\nابدأ_CSS\nلون red\nأنهِ_CSS\nابدأ_JS\nاطبع 1\nأنهِ_JS");
    assert!(!result.success);
    assert_eq!(result.line_number, Some(1));
    assert!(result.css.unwrap().contains("color: red;"));
    assert_eq!(result.javascript.as_deref(), Some("console.log(1);"));
    assert!(result.combined_output.is_some());
}

#[test]
fn oversized_source_is_rejected() {
    let config = InterpreterConfig {
        max_source_bytes: 8,
        ..InterpreterConfig::default()
    };
    let result = Interpreter::new(config).interpret("أضف فقرة طويلة جدا");
    assert!(!result.success);
    assert!(result.combined_output.is_none());
    assert!(result.error.unwrap().contains("exceeds the 8-byte limit"));
}

#[test]
fn zero_limit_disables_size_check() {
    let config = InterpreterConfig {
        max_source_bytes: 0,
        ..InterpreterConfig::default()
    };
    let source = "أضف فقرة أ\n".repeat(1000);
    assert!(Interpreter::new(config).interpret(&source).success);
}

#[test]
fn json_shape() {
    let result = interpret("أنهِ قائمة\nطير");
    let value: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();

    assert_eq!(value["success"], false);
    assert_eq!(value["lineNumber"], 1);
    assert_eq!(value["error"], "cannot close list: nothing is open");
    assert!(value["combinedOutput"].is_string());
    assert!(value["html"].is_string());
    assert!(value.get("css").is_none());
    assert!(value.get("javascript").is_none());
    assert!(value.get("sections").is_none());
}

#[test]
fn json_omits_empty_warnings() {
    let value: serde_json::Value =
        serde_json::from_str(&interpret("أضف فقرة أ").to_json()).unwrap();
    assert_eq!(value["success"], true);
    assert!(value.get("warnings").is_none());
    assert!(value.get("error").is_none());
}

#[test]
fn diagnostics_are_sorted_by_line() {
    let result = interpret("ابدأ_CSS\nغريب\nأنهِ_CSS\nطير");
    let lines: Vec<usize> = result.diagnostics().iter().map(|(_, d)| d.line).collect();
    assert_eq!(lines, vec![2, 4]);
    assert_eq!(result.section(Target::Css).unwrap().warnings.len(), 1);
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct Exploding;

impl Emitter for Exploding {
    fn target(&self) -> Target {
        Target::JavaScript
    }

    fn execute(
        &mut self,
        command: &ParsedCommand,
        _warnings: &mut Warnings<'_>,
    ) -> Result<Dispatch, EmitError> {
        if command.key == "انفجر" {
            panic!("boom");
        }
        Ok(Dispatch::Handled)
    }

    fn finish(&mut self, _warnings: &mut Warnings<'_>) -> String {
        String::new()
    }
}

#[test]
fn emitter_panic_becomes_internal_error() {
    let sections = split_sections("سطر\nانفجر\nسطر");
    let refs: Vec<_> = sections.iter().collect();
    let result = run_emitter(Exploding, &refs);

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 2);
    assert_eq!(result.errors[0].message, "internal emitter failure: boom");
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[test]
fn detects_single_vocabularies() {
    assert_eq!(detect_target("افتح صفحة\nأضف فقرة أ"), DetectedTarget::Html);
    assert_eq!(detect_target("اختر p\nلون red"), DetectedTarget::Css);
    assert_eq!(detect_target("متغير س 1\nاطبع س"), DetectedTarget::JavaScript);
}

#[test]
fn detects_mixed_sources() {
    assert_eq!(detect_target("أضف فقرة أ\nاطبع 1"), DetectedTarget::Mixed);
    assert_eq!(detect_target("ابدأ_CSS\nأنهِ_CSS"), DetectedTarget::Mixed);
}

#[test]
fn detection_defaults_to_html() {
    assert_eq!(detect_target(""), DetectedTarget::Html);
    assert_eq!(detect_target("كلام غير مفهوم"), DetectedTarget::Html);
}
