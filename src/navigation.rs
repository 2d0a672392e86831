//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::{
    endpoints,
    language::{Language, Phrase},
};

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'static str,
    is_current: bool,
}

impl Link<'_> {
    fn into_desktop_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-amber-700 rounded-sm lg:bg-transparent
        lg:text-amber-700 lg:p-0 dark:text-white lg:dark:text-amber-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-amber-700 lg:p-0
        dark:text-white lg:dark:hover:text-amber-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!( a href=(self.url) class=(style) { (self.title) } )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    language: Language,
}

impl NavBar<'_> {
    /// Get the navigation bar with link titles in `language`.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str, language: Language) -> NavBar<'_> {
        let link = |url: &'static str, phrase: Phrase| Link {
            url,
            title: language.text(phrase),
            is_current: active_endpoint == url,
        };

        let links = vec![
            link(endpoints::CALCULATOR_VIEW, Phrase::Calculator),
            link(endpoints::HISTORY_VIEW, Phrase::History),
            link(endpoints::COCOMETER_VIEW, Phrase::Cocometer),
            link(endpoints::RATE_VIEW, Phrase::Rate),
            link(endpoints::DOOR_VIEW, Phrase::ToiletDoor),
            link(endpoints::SALARY_SETTINGS_VIEW, Phrase::SalaryConfig),
        ];

        NavBar { links, language }
    }

    pub fn into_html(self) -> Markup {
        let other_language = match self.language {
            Language::En => Language::Pt,
            Language::Pt => Language::En,
        };
        let bottom_link_class = |is_current: bool| -> &'static str {
            if is_current {
                "flex w-full min-w-0 items-center justify-center rounded-lg \
                bg-amber-100 px-2.5 py-2 text-xs font-semibold leading-tight \
                text-amber-800 shadow-sm sm:px-4 sm:text-sm \
                dark:bg-amber-900/30 dark:text-amber-200"
            } else {
                "flex w-full min-w-0 items-center justify-center rounded-lg \
                px-2.5 py-2 text-xs font-semibold leading-tight text-gray-600 \
                sm:px-4 sm:text-sm \
                hover:bg-amber-50/70 hover:text-amber-700 dark:text-gray-300 \
                dark:hover:bg-amber-900/20 dark:hover:text-amber-200"
            }
        };

        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span class="text-2xl" { "💩" }

                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Cocoladora"
                        }
                    }

                    button
                        type="button"
                        hx-post=(endpoints::LANGUAGE_API)
                        hx-vals=(format!(r#"{{"language": "{}"}}"#, other_language.code()))
                        hx-target-error="#alert-container"
                        class="text-sm font-medium uppercase text-amber-800 dark:text-amber-400"
                    {
                        (other_language.code())
                    }

                    div class="hidden w-full lg:block lg:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            lg:flex-row lg:space-x-8 rtl:space-x-reverse lg:mt-0
                            lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for link in self.links.clone().into_iter() {
                                li { (link.into_desktop_html()) }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                div class="mx-auto max-w-screen-xl px-4 pb-4"
                {
                    ul
                        class="grid grid-cols-3 gap-2 px-4 py-3 rounded-xl border
                        border-gray-200 bg-white/95 shadow-lg backdrop-blur
                        dark:border-gray-700 dark:bg-gray-900/95"
                        aria-label="Primary"
                    {
                        @for link in self.links.iter() {
                            li class="min-w-0" {
                                a
                                    href=(link.url)
                                    class=(bottom_link_class(link.is_current))
                                    aria-current=[link.is_current.then_some("page")]
                                {
                                    span class="truncate" { (link.title) }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}
