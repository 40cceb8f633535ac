#![allow(dead_code)]

use radiotv_config::IngestConfig;
use radiotv_extract::xml::Document;
use radiotv_ingest::Context;
use radiotv_repository::Pid;
use radiotv_repository::client::MockRepository;

pub const TEMPLATE: &str = "doms:Template_Program";
pub const HAS_FILE: &str = "http://doms.statsbiblioteket.dk/relations/default/0/1/#hasFile";
pub const FILENAME: &str = "2010-01-01_dr1_news.xml";
pub const URL_A: &str = "http://bitfinder.statsbiblioteket.dk/bart/dr1_a.ts";
pub const URL_B: &str = "http://bitfinder.statsbiblioteket.dk/bart/dr1_b.ts";
pub const URL_C: &str = "http://bitfinder.statsbiblioteket.dk/bart/dr1_c.ts";
pub const FILE_A: &str = "uuid:file-a";
pub const FILE_B: &str = "uuid:file-b";
pub const FILE_C: &str = "uuid:file-c";

/// Describes a program record to generate.
pub struct Fixture<'a> {
    pub title: &'a str,
    pub ritzau_id: &'a str,
    pub gallup_id: &'a str,
    pub urls: &'a [&'a str],
    pub channel: &'a str,
}
impl Default for Fixture<'_> {
    fn default() -> Self {
        Self {
            title: "TV Avisen",
            ritzau_id: "4711",
            gallup_id: "tv-0815",
            urls: &[URL_A, URL_B],
            channel: "dr1",
        }
    }
}
impl Fixture<'_> {
    pub fn xml(&self) -> String {
        let urls: String = self.urls.iter().map(|url| format!("<fileUrl>{url}</fileUrl>")).collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<program>
    <fileUrls>{urls}</fileUrls>
    <pbcore>
        <pbc:PBCoreDescriptionDocument xmlns:pbc="http://www.pbcore.org/PBCore/PBCoreNamespace.html">
            <pbc:pbcoreIdentifier>
                <pbc:identifier>{ritzau}</pbc:identifier>
                <pbc:identifierSource>id</pbc:identifierSource>
            </pbc:pbcoreIdentifier>
            <pbc:pbcoreIdentifier>
                <pbc:identifier>{gallup}</pbc:identifier>
                <pbc:identifierSource>tvmeter</pbc:identifierSource>
            </pbc:pbcoreIdentifier>
            <pbc:pbcoreTitle>
                <pbc:title>{title}</pbc:title>
                <pbc:titleType>titel</pbc:titleType>
            </pbc:pbcoreTitle>
        </pbc:PBCoreDescriptionDocument>
    </pbcore>
    <originals>
        <ritzau:ritzau_original xmlns:ritzau="http://doms.statsbiblioteket.dk/types/ritzau_original/0/1/#">
            <ritzau:kanalnavn>{channel}</ritzau:kanalnavn>
        </ritzau:ritzau_original>
        <gallup:gallup_original xmlns:gallup="http://doms.statsbiblioteket.dk/types/gallup_original/0/1/#">
            <gallup:station>{channel}</gallup:station>
        </gallup:gallup_original>
    </originals>
    <pb:programBroadcast xmlns:pb="http://doms.statsbiblioteket.dk/types/program_broadcast/0/1/#">
        <pb:channelId>{channel}</pb:channelId>
    </pb:programBroadcast>
</program>"#,
            ritzau = self.ritzau_id,
            gallup = self.gallup_id,
            title = self.title,
            channel = self.channel,
        )
    }

    pub fn document(&self) -> Document {
        self.xml().parse().unwrap()
    }
}

/// The default record.
pub fn record() -> Document {
    Fixture::default().document()
}

/// A repository with the program template and three file objects.
pub fn repository() -> MockRepository {
    MockRepository::default()
        .with_template(TEMPLATE)
        .with_file(URL_A, FILE_A)
        .with_file(URL_B, FILE_B)
        .with_file(URL_C, FILE_C)
}

pub fn context() -> Context {
    Context::from_config(&IngestConfig::default()).unwrap()
}

pub fn pids(list: &[&str]) -> Vec<Pid> {
    list.iter().map(|pid| Pid::from(*pid)).collect()
}
