mod app;
mod bridge;
mod dto;
mod incidents;
mod leaflet;
mod map_view;
mod popup;
mod stations;

fn main() {
    leptos::mount_to_body(app::App);
}
