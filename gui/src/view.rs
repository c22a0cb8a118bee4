use crate::render::{ExampleCard, HashtagList, RenderedOutput};
use crate::{Field, Message, ResponseSource};
use iced::widget::{button, column, container, pick_list, row, text, text_input, Column, Row};
use iced::{theme, Element, Length, Theme};
use recommend_client::FunnelLink;
use scriptify_core::FormFields;
use std::collections::HashSet;

const METRICS_PER_ROW: usize = 4;

fn labeled_input<'a>(field: Field, value: &'a str) -> Element<'a, Message, Theme> {
    column![
        text(field.label()).size(13),
        text_input(field.placeholder(), value)
            .on_input(move |v| Message::FieldChanged(field, v))
            .on_submit(Message::Submit)
            .padding(8),
    ]
    .spacing(4)
    .width(Length::Fill)
    .into()
}

fn section<'a>(title: &'a str, body: impl Into<Element<'a, Message, Theme>>) -> Column<'a, Message, Theme> {
    column![text(title).size(18), body.into()].spacing(6)
}

pub fn form_panel<'a>(
    form: &'a FormFields,
    platforms: &'a [String],
    pending: bool,
) -> Element<'a, Message, Theme> {
    let platform = column![
        text(Field::Platform.label()).size(13),
        pick_list(platforms, Some(form.platform.clone()), |p| {
            Message::FieldChanged(Field::Platform, p)
        })
        .padding(8),
    ]
    .spacing(4);

    let mut metrics = Column::new().spacing(10);
    for chunk in Field::METRICS.chunks(METRICS_PER_ROW) {
        let cells: Vec<Element<'a, Message, Theme>> = chunk
            .iter()
            .map(|field| labeled_input(*field, field.value(form)))
            .collect();
        metrics = metrics.push(Row::with_children(cells).spacing(10));
    }

    let mut submit = button(text(if pending {
        "Generando…"
    } else {
        "Generar recomendación"
    }))
    .padding(10);
    let mut demo = button(text("Ver demo")).padding(10).style(theme::Button::Secondary);
    if !pending {
        submit = submit.on_press(Message::Submit);
        demo = demo.on_press(Message::ShowDemo);
    }

    container(
        column![
            row![
                platform,
                labeled_input(Field::Niche, &form.niche)
            ]
            .spacing(10),
            metrics,
            labeled_input(Field::Specialties, &form.specialties),
            row![submit, demo].spacing(10),
        ]
        .spacing(14),
    )
    .padding(16)
    .style(theme::Container::Box)
    .into()
}

pub fn loading_panel<'a>(quip: &'a str) -> Element<'a, Message, Theme> {
    container(column![text("Pensando…").size(18), text(quip).size(14)].spacing(6))
        .padding(16)
        .width(Length::Fill)
        .style(theme::Container::Box)
        .into()
}

fn example_card<'a>(card: &'a ExampleCard) -> Element<'a, Message, Theme> {
    let title: Element<'a, Message, Theme> = match &card.link {
        Some(link) => button(text(&card.title).size(15))
            .on_press(Message::CopyLink(link.clone()))
            .padding(0)
            .style(theme::Button::Text)
            .into(),
        None => text(&card.title).size(15).into(),
    };

    let mut body = column![title, text(&card.meta).size(12)].spacing(4);
    if !card.hashtags.is_empty() {
        body = body.push(text(card.hashtags.join("  ")).size(12));
    }

    container(body)
        .padding(10)
        .width(Length::Fill)
        .style(theme::Container::Box)
        .into()
}

pub fn results_panel<'a>(
    output: &'a RenderedOutput,
    source: &'a ResponseSource,
    liked: &HashSet<usize>,
) -> Element<'a, Message, Theme> {
    let mut content = Column::new().spacing(16);

    match source {
        ResponseSource::Live => {}
        ResponseSource::Fallback { .. } => {
            content = content.push(
                text("No pudimos contactar al servicio. Te mostramos una recomendación de ejemplo.")
                    .size(13),
            );
        }
        ResponseSource::Demo => {
            content = content.push(text("Modo demo: datos de ejemplo.").size(13));
        }
    }

    content = content
        .push(section("Recomendación", text(&output.recommendation)))
        .push(section("Por qué", text(&output.reason)));

    let mut ideas = Column::new().spacing(6);
    for (index, idea) in output.ideas.iter().enumerate() {
        let like = if liked.contains(&index) {
            button(text("♥ Te gustó")).style(theme::Button::Positive)
        } else {
            button(text("♡ Me gusta"))
                .style(theme::Button::Secondary)
                .on_press(Message::LikeIdea(index))
        };
        ideas = ideas.push(
            row![text(format!("{}. {}", index + 1, idea)).width(Length::Fill), like].spacing(10),
        );
    }
    content = content.push(section("Ideas", ideas));

    let hashtags = match &output.hashtags {
        HashtagList::Tags(tags) => text(tags.join("  ")),
        HashtagList::Placeholder(placeholder) => text(*placeholder),
    };
    content = content.push(section("Hashtags", hashtags));

    let examples = Column::with_children(
        output
            .examples
            .iter()
            .map(example_card)
            .collect::<Vec<_>>(),
    )
    .spacing(8);
    content = content.push(section("Ejemplos", examples));

    content.into()
}

pub fn funnel_panel<'a>(links: &'a [FunnelLink]) -> Element<'a, Message, Theme> {
    let buttons: Vec<Element<'a, Message, Theme>> = links
        .iter()
        .enumerate()
        .map(|(index, link)| {
            button(text(&link.label))
                .on_press(Message::OpenFunnel(index))
                .padding(8)
                .into()
        })
        .collect();

    section("¿Quieres ayuda con esto?", Row::with_children(buttons).spacing(10)).into()
}
